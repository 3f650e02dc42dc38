use url::Url;

/// Parameters the identity provider appends when redirecting back.
///
/// Looked up in the query string first, then in the fragment
/// (`response_mode=fragment`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl AuthCallback {
    /// `None` unless the URL carries a `code` or an `error`
    pub fn from_url(url: &Url) -> Option<Self> {
        let mut callback = AuthCallback::default();

        let query_pairs = url.query_pairs().into_owned();
        let fragment_pairs =
            url::form_urlencoded::parse(url.fragment().unwrap_or_default().as_bytes())
                .into_owned();

        for (key, value) in query_pairs.chain(fragment_pairs) {
            let slot = match key.as_str() {
                "code" => &mut callback.code,
                "state" => &mut callback.state,
                "error" => &mut callback.error,
                "error_description" => &mut callback.error_description,
                _ => continue,
            };
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value);
            }
        }

        if callback.code.is_some() || callback.error.is_some() {
            Some(callback)
        } else {
            None
        }
    }

    pub fn is_callback(url: &Url) -> bool {
        Self::from_url(url).is_some()
    }

    /// Provider error, formatted for display
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|error| match self.error_description {
            Some(ref description) => format!("{error}: {description}"),
            None => error.clone(),
        })
    }
}

/// Origin + path of a callback URL, so the code cannot be replayed on reload
pub fn clean_callback_url(url: &Url) -> Url {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.set_fragment(None);
    clean
}
