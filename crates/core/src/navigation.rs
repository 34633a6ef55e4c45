//! Role-driven sidebar navigation.

use crate::roles::Role;

/// Screens reachable from the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Dashboard,
    Clubs,
    Regions,
    Talukas,
    Groups,
    Players,
    Referees,
    Competitions,
    ActivityLogs,
}

impl Screen {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Clubs => "Clubs",
            Self::Regions => "Regions",
            Self::Talukas => "Talukas",
            Self::Groups => "Groups",
            Self::Players => "Players",
            Self::Referees => "Referees",
            Self::Competitions => "Competitions",
            Self::ActivityLogs => "Activity Logs",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::Dashboard => "/dashboard",
            Self::Clubs => "/clubs",
            Self::Regions => "/regions",
            Self::Talukas => "/talukas",
            Self::Groups => "/groups",
            Self::Players => "/players",
            Self::Referees => "/referees",
            Self::Competitions => "/competitions",
            Self::ActivityLogs => "/activity-logs",
        }
    }
}

const ADMIN_SCREENS: &[Screen] = &[
    Screen::Dashboard,
    Screen::Clubs,
    Screen::Regions,
    Screen::Talukas,
    Screen::Groups,
    Screen::Players,
    Screen::Referees,
    Screen::Competitions,
    Screen::ActivityLogs,
];

const CLUB_ADMIN_SCREENS: &[Screen] = &[Screen::Dashboard, Screen::Players, Screen::Competitions];

/// A sidebar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub screen: Screen,
    pub label: &'static str,
    pub path: &'static str,
}

impl From<Screen> for NavLink {
    fn from(screen: Screen) -> Self {
        Self {
            screen,
            label: screen.label(),
            path: screen.path(),
        }
    }
}

/// Sidebar links for a role; no role means no links.
pub fn sidebar_links(role: Option<Role>) -> Vec<NavLink> {
    let screens: &[Screen] = match role {
        Some(Role::Admin) => ADMIN_SCREENS,
        Some(Role::ClubAdmin) => CLUB_ADMIN_SCREENS,
        None => &[],
    };
    screens.iter().copied().map(NavLink::from).collect()
}

/// Whether `role` may open `screen`.
pub fn can_access(role: Option<Role>, screen: Screen) -> bool {
    sidebar_links(role).iter().any(|link| link.screen == screen)
}

/// The collapsible navigation sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sidebar {
    links: Vec<NavLink>,
    collapsed: bool,
}

impl Sidebar {
    pub fn for_role(role: Option<Role>) -> Self {
        Self {
            links: sidebar_links(role),
            collapsed: false,
        }
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn toggle(&mut self) {
        self.collapsed = !self.collapsed;
    }

    /// Render as text: labels when expanded, initials when collapsed.
    pub fn render(&self, active: Option<Screen>) -> Vec<String> {
        self.links
            .iter()
            .map(|link| {
                let marker = if Some(link.screen) == active { ">" } else { " " };
                if self.collapsed {
                    let initial = link.label.chars().next().unwrap_or(' ');
                    format!("{marker}{initial}")
                } else {
                    format!("{marker} {:<14} {}", link.label, link.path)
                }
            })
            .collect()
    }
}
