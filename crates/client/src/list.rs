//! Async list controller: drives a [`ListState`] against the API.
//!
//! Every fetch is tagged with a ticket. Only the response for the most
//! recently issued ticket may update the view, so a slow response for an
//! old query can never overwrite a newer one.

use clubdesk_core::entities::Resource;
use clubdesk_core::list::{ListQuery, ListResult, ListState};

use crate::api::ApiClient;
use crate::error::ApiError;

/// What a list screen currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ListView<T> {
    Idle,
    Loading,
    Loaded(ListResult<T>),
    /// The last fetch failed; the screen offers a retry.
    Failed(String),
}

impl<T> ListView<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn result(&self) -> Option<&ListResult<T>> {
        match self {
            Self::Loaded(result) => Some(result),
            _ => None,
        }
    }
}

/// Identity of one in-flight fetch and the query it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub token: u64,
    pub query: ListQuery,
}

/// What [`ListController::complete`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The response became the visible state.
    Applied {
        /// The current page fell outside the new page count and was
        /// clamped; the caller should fetch again.
        page_moved: bool,
    },
    /// A newer ticket was issued (or the controller was detached).
    Stale,
}

pub struct ListController<E> {
    state: ListState,
    view: ListView<E>,
    latest: u64,
    detached: bool,
}

impl<E: Resource> ListController<E> {
    pub fn new(limit: u32) -> Self {
        Self {
            state: ListState::new(limit),
            view: ListView::Idle,
            latest: 0,
            detached: false,
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn query(&self) -> &ListQuery {
        self.state.query()
    }

    pub fn view(&self) -> &ListView<E> {
        &self.view
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    // ---- query changes (each returns whether the query changed) ----

    pub fn set_search(&mut self, text: &str) -> bool {
        self.state.set_search(text)
    }

    pub fn toggle_sort(&mut self, column: &str) -> bool {
        self.state.toggle_sort(column)
    }

    pub fn set_page(&mut self, page: u32) -> bool {
        self.state.set_page(page)
    }

    pub fn set_limit(&mut self, limit: u32) -> bool {
        self.state.set_limit(limit)
    }

    pub fn set_filter(&mut self, key: &str, value: &str) -> bool {
        self.state.set_filter(key, value)
    }

    pub fn reset_filters(&mut self) -> bool {
        self.state.reset_filters()
    }

    // ---- fetch lifecycle ----

    /// Issue a ticket for the current query and show the loading state.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest += 1;
        self.detached = false;
        self.view = ListView::Loading;
        FetchTicket {
            token: self.latest,
            query: self.state.query().clone(),
        }
    }

    /// Apply a response if its ticket is still the latest.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<ListResult<E>, ApiError>,
    ) -> Completion {
        if self.detached || ticket.token != self.latest {
            tracing::debug!(
                collection = E::COLLECTION,
                token = ticket.token,
                latest = self.latest,
                detached = self.detached,
                "Dropping stale list response",
            );
            return Completion::Stale;
        }

        match result {
            Ok(page) => {
                let page_moved = self.state.apply_result(&page);
                self.view = ListView::Loaded(page);
                Completion::Applied { page_moved }
            }
            Err(err) => {
                tracing::warn!(collection = E::COLLECTION, error = %err, "List fetch failed");
                self.view = ListView::Failed(err.to_string());
                Completion::Applied { page_moved: false }
            }
        }
    }

    /// Fetch the current query and apply it. Also the retry action after
    /// a failure.
    ///
    /// When the response shrinks the page count below the current page,
    /// the page is clamped and fetched once more.
    pub async fn refresh(&mut self, api: &ApiClient) -> &ListView<E> {
        for _ in 0..2 {
            let ticket = self.begin_fetch();
            let result = api.resource::<E>().list(&ticket.query).await;
            match self.complete(ticket, result) {
                Completion::Applied { page_moved: true } => continue,
                _ => break,
            }
        }
        &self.view
    }

    /// Abandon every in-flight ticket; later completions are ignored.
    pub fn detach(&mut self) {
        self.detached = true;
        if self.view.is_loading() {
            self.view = ListView::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clubdesk_core::entities::Region;

    fn region(id: i64, name: &str) -> Region {
        serde_json::from_value(serde_json::json!({"id": id, "name": name})).unwrap()
    }

    fn page_of(names: &[&str], total_pages: u32) -> ListResult<Region> {
        ListResult {
            items: names
                .iter()
                .enumerate()
                .map(|(i, n)| region(i as i64 + 1, n))
                .collect(),
            page: 1,
            total_pages: Some(total_pages),
            total_count: Some(names.len() as u64),
        }
    }

    #[test]
    fn tickets_increase_and_capture_the_query() {
        let mut list = ListController::<Region>::new(10);
        let first = list.begin_fetch();
        list.set_search("north");
        let second = list.begin_fetch();
        assert!(second.token > first.token);
        assert_eq!(first.query.search(), "");
        assert_eq!(second.query.search(), "north");
        assert!(list.view().is_loading());
    }

    #[test]
    fn stale_response_never_overwrites_newer_one() {
        let mut list = ListController::<Region>::new(10);
        let old = list.begin_fetch();
        let new = list.begin_fetch();

        assert_eq!(
            list.complete(new, Ok(page_of(&["Konkan"], 1))),
            Completion::Applied { page_moved: false }
        );
        assert_eq!(list.complete(old, Ok(page_of(&["Vidarbha"], 1))), Completion::Stale);

        let shown = list.view().result().unwrap();
        assert_eq!(shown.items[0].name, "Konkan");
    }

    #[test]
    fn stale_error_is_ignored_too() {
        let mut list = ListController::<Region>::new(10);
        let old = list.begin_fetch();
        let new = list.begin_fetch();
        list.complete(new, Ok(page_of(&["Konkan"], 1)));
        let err = ApiError::Io(std::io::Error::other("late"));
        assert_eq!(list.complete(old, Err(err)), Completion::Stale);
        assert!(list.view().result().is_some());
    }

    #[test]
    fn failure_is_shown_with_message() {
        let mut list = ListController::<Region>::new(10);
        let ticket = list.begin_fetch();
        list.complete(ticket, Err(ApiError::Io(std::io::Error::other("boom"))));
        assert!(matches!(list.view(), ListView::Failed(msg) if msg.contains("boom")));
    }

    #[test]
    fn detach_ignores_in_flight_results() {
        let mut list = ListController::<Region>::new(10);
        let ticket = list.begin_fetch();
        list.detach();
        assert_eq!(list.complete(ticket, Ok(page_of(&["Marathwada"], 1))), Completion::Stale);
        assert_eq!(list.view(), &ListView::Idle);
    }

    #[test]
    fn shrinking_result_clamps_page() {
        let mut list = ListController::<Region>::new(10);
        let ticket = list.begin_fetch();
        list.complete(ticket, Ok(page_of(&["A"], 5)));
        assert!(list.set_page(4));

        let ticket = list.begin_fetch();
        let completion = list.complete(ticket, Ok(page_of(&["A"], 2)));
        assert_eq!(completion, Completion::Applied { page_moved: true });
        assert_eq!(list.query().page(), 2);
    }
}
