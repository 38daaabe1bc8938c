use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use shellcache::{Network, Request};
use tracing::debug;
use url::Url;

use super::{Post, RawPost, User, derive_posts};
use crate::error::DataLoadError;

/// The two collections the portal reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub posts: Url,
    pub users: Url,
}

impl Endpoints {
    pub fn new(api_base: &Url) -> Result<Self, url::ParseError> {
        let mut base = api_base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            posts: base.join("posts")?,
            users: base.join("users")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsData {
    pub posts: Vec<Post>,
    pub users: Vec<User>,
}

/// Fetch posts and users concurrently and derive the display posts.
///
/// Both requests must succeed; a failure of either discards the other.
pub fn load_data<N: Network>(
    network: &N,
    endpoints: &Endpoints,
    today: NaiveDate,
) -> Result<NewsData, DataLoadError> {
    let (posts, users) = rayon::join(
        || fetch_json::<Vec<RawPost>, _>(network, &endpoints.posts),
        || fetch_json::<Vec<User>, _>(network, &endpoints.users),
    );
    let (posts, users) = (posts?, users?);
    debug!(posts = posts.len(), users = users.len(), "news data loaded");
    Ok(NewsData {
        posts: derive_posts(posts, &users, today),
        users,
    })
}

fn fetch_json<T: DeserializeOwned, N: Network>(network: &N, url: &Url) -> Result<T, DataLoadError> {
    let response = network.fetch(&Request::get(url.clone()))?;
    if !response.is_ok() {
        return Err(DataLoadError::Status {
            url: url.to_string(),
            status: response.status,
            status_text: response.status_text,
        });
    }
    serde_json::from_slice(&response.body).map_err(|source| DataLoadError::Decode {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use shellcache::{OfflineError, Response};

    use super::*;
    use crate::news::tests::today;

    /// Canned responses keyed by URL; anything else is offline.
    #[derive(Default)]
    pub(crate) struct CannedNetwork(pub HashMap<String, Response>);

    impl CannedNetwork {
        pub fn with(mut self, url: &str, response: Response) -> Self {
            self.0.insert(url.to_string(), response);
            self
        }
    }

    impl Network for CannedNetwork {
        fn fetch(&self, request: &Request) -> Result<Response, OfflineError> {
            self.0
                .get(request.url.as_str())
                .cloned()
                .ok_or_else(|| OfflineError::new(request.url.as_str(), "unreachable"))
        }
    }

    pub(crate) const POSTS: &str = r#"[
        {"userId":1,"id":1,"title":"Rust ships","body":"The compiler got faster. Everyone cheered"},
        {"userId":2,"id":2,"title":"apple harvest","body":"Orchards are full"},
        {"userId":9,"id":3,"title":"Apple earnings","body":"Numbers went up"}
    ]"#;
    pub(crate) const USERS: &str = r#"[
        {"id":1,"name":"Leanne Graham"},
        {"id":2,"name":"Ervin Howell"}
    ]"#;

    pub(crate) fn endpoints() -> Endpoints {
        Endpoints::new(&Url::parse("https://api.example/").unwrap()).unwrap()
    }

    pub(crate) fn online() -> CannedNetwork {
        CannedNetwork::default()
            .with("https://api.example/posts", Response::new(200, "OK", POSTS))
            .with("https://api.example/users", Response::new(200, "OK", USERS))
    }

    #[test]
    fn test_endpoints_keep_base_path() {
        let endpoints = Endpoints::new(&Url::parse("http://127.0.0.1:9000/v1").unwrap()).unwrap();
        assert_eq!(endpoints.posts.as_str(), "http://127.0.0.1:9000/v1/posts");
        assert_eq!(endpoints.users.as_str(), "http://127.0.0.1:9000/v1/users");
    }

    #[test]
    fn test_load_data_derives_posts() {
        let data = load_data(&online(), &endpoints(), today()).unwrap();
        assert_eq!(data.users.len(), 2);
        assert_eq!(data.posts.len(), 3);
        assert_eq!(data.posts[0].author.name, "Leanne Graham");
        assert_eq!(data.posts[2].author, User::unknown());
    }

    #[test]
    fn test_load_data_fails_when_either_call_fails() {
        let network = CannedNetwork::default()
            .with("https://api.example/posts", Response::new(200, "OK", POSTS));
        let err = load_data(&network, &endpoints(), today()).unwrap_err();
        assert!(matches!(err, DataLoadError::Network(_)));
    }

    #[test]
    fn test_load_data_rejects_error_status() {
        let network = online().with(
            "https://api.example/users",
            Response::new(503, "Service Unavailable", r#"{"error":"Offline"}"#),
        );
        let err = load_data(&network, &endpoints(), today()).unwrap_err();
        assert!(matches!(err, DataLoadError::Status { status: 503, .. }));
    }

    #[test]
    fn test_load_data_rejects_malformed_body() {
        let network = online().with("https://api.example/posts", Response::new(200, "OK", "<html>"));
        let err = load_data(&network, &endpoints(), today()).unwrap_err();
        assert!(matches!(err, DataLoadError::Decode { .. }));
    }
}
