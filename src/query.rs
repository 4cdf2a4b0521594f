/// Search filters taken from the command line. Values are passed through to
/// the Gmail query language untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub sender: Option<String>,
    pub subject: Option<String>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub older_than: Option<String>,
    pub newer_than: Option<String>,
}

// Builds a Gmail search string, one `key:value ` token per present filter
pub fn build_query(filter: &FilterSpec) -> String {
    let mut query = String::new();

    if let Some(sender) = &filter.sender {
        query.push_str(&format!("from:{} ", sender));
    }
    if let Some(subject) = &filter.subject {
        // Underscores let callers pass multi-word subjects as one argument
        query.push_str(&format!("subject:{} ", subject.replace('_', " ")));
    }
    if let Some(after) = &filter.after {
        query.push_str(&format!("after:{} ", after));
    }
    if let Some(before) = &filter.before {
        query.push_str(&format!("before:{} ", before));
    }
    if let Some(older_than) = &filter.older_than {
        query.push_str(&format!("older_than:{} ", older_than));
    }
    if let Some(newer_than) = &filter.newer_than {
        query.push_str(&format!("newer_than:{} ", newer_than));
    }

    query
}
