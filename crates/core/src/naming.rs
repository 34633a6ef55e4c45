//! Field-name conversions between Rust, wire and display forms.

/// Split an identifier into words.
///
/// Word boundaries are `_`, `-`, whitespace, and a lowercase letter or digit
/// followed by an uppercase letter (`dateOfBirth` -> `date`, `Of`, `Birth`).
fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower_or_digit = false;

    for c in name.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower_or_digit = false;
            continue;
        }
        if c.is_uppercase() && prev_lower_or_digit && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower_or_digit = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Turn a snake_case or camelCase field name into a Title Case label.
///
/// # Examples
///
/// ```
/// use clubdesk_core::naming::humanize;
/// assert_eq!(humanize("club_name"), "Club Name");
/// assert_eq!(humanize("dateOfBirth"), "Date Of Birth");
/// ```
pub fn humanize(name: &str) -> String {
    split_words(name)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Convert a snake_case Rust field name into its camelCase wire name.
///
/// # Examples
///
/// ```
/// use clubdesk_core::naming::snake_to_camel;
/// assert_eq!(snake_to_camel("group_ids"), "groupIds");
/// assert_eq!(snake_to_camel("email"), "email");
/// ```
pub fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
