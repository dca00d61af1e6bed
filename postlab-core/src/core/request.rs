use anyhow::{bail, Context, Result};
use log::{debug, info};
use serde_json::Value;
use std::sync::Arc;

use crate::core::post::{NewPost, Post};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// How many posts the list request converts.
pub const FETCH_LIMIT: usize = 5;

/// Blocking HTTP calls returning the response body as text.
pub trait HttpTransport: Send + Sync {
    fn get(&self, url: &str) -> Result<String>;
    fn post_json(&self, url: &str, body: &str) -> Result<String>;
}

/// `HttpTransport` backed by attohttpc.
#[derive(Debug, Default, Clone)]
pub struct AttoTransport;

impl HttpTransport for AttoTransport {
    fn get(&self, url: &str) -> Result<String> {
        let response = attohttpc::get(url).send()?.error_for_status()?;
        Ok(response.text()?)
    }

    fn post_json(&self, url: &str, body: &str) -> Result<String> {
        let response = attohttpc::post(url)
            .text(body)
            .header("Content-Type", JSON_CONTENT_TYPE)
            .send()?
            .error_for_status()?;
        Ok(response.text()?)
    }
}

// Client that talks to one posts endpoint
#[derive(Clone)]
pub struct PostsClient {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
}

impl PostsClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_transport(endpoint, Arc::new(AttoTransport))
    }

    pub fn with_transport(endpoint: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// GET the endpoint and convert the first `FETCH_LIMIT` array elements.
    /// Fails when the array is shorter than that.
    pub fn fetch_posts(&self) -> Result<Vec<Post>> {
        info!("GET {}", self.endpoint);
        let text = self.transport.get(&self.endpoint)?;
        let array: Vec<Value> =
            serde_json::from_str(&text).context("Response is not a JSON array")?;
        debug!("GET {} returned {} elements", self.endpoint, array.len());

        let len = array.len();
        if len < FETCH_LIMIT {
            bail!("Index {len} out of range [0..{len})");
        }

        array
            .into_iter()
            .take(FETCH_LIMIT)
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value::<Post>(value)
                    .with_context(|| format!("Element {} is not a post", index))
            })
            .collect()
    }

    /// POST `draft` as JSON and map the returned object to a post.
    pub fn create_post(&self, draft: &NewPost) -> Result<Post> {
        let payload = serde_json::to_string(draft)?;
        info!("POST {} {}", self.endpoint, payload);

        let text = self.transport.post_json(&self.endpoint, &payload)?;
        let post: Post = serde_json::from_str(&text).context("Response is not a post object")?;
        debug!("POST {} created post #{}", self.endpoint, post.id());
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::Mutex;
    use std::thread::{self, JoinHandle};

    struct CannedTransport {
        response: String,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl CannedTransport {
        fn new(response: &str) -> Arc<Self> {
            Arc::new(Self {
                response: response.to_string(),
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    impl HttpTransport for CannedTransport {
        fn get(&self, _url: &str) -> Result<String> {
            Ok(self.response.clone())
        }

        fn post_json(&self, url: &str, body: &str) -> Result<String> {
            self.sent.lock().unwrap().push((url.to_string(), body.to_string()));
            Ok(self.response.clone())
        }
    }

    struct DownTransport;

    impl HttpTransport for DownTransport {
        fn get(&self, _url: &str) -> Result<String> {
            Err(anyhow!("connection refused"))
        }

        fn post_json(&self, _url: &str, _body: &str) -> Result<String> {
            Err(anyhow!("connection refused"))
        }
    }

    fn canned_client(response: &str) -> PostsClient {
        PostsClient::with_transport("http://test/posts", CannedTransport::new(response))
    }

    fn posts_json(count: usize) -> String {
        let items: Vec<String> = (1..=count)
            .map(|i| format!(r#"{{"userId":1,"id":{i},"title":"title {i}","body":"body {i}"}}"#))
            .collect();
        format!("[{}]", items.join(","))
    }

    /// Accepts one connection, answers with `status` and `body`, and hands
    /// back the raw request head and body it received.
    fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<(Vec<String>, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/posts", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);

            let mut head = Vec::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end().to_string();
                if line.is_empty() {
                    break;
                }
                head.push(line);
            }

            let length = head
                .iter()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let mut request_body = vec![0; length];
            reader.read_exact(&mut request_body).unwrap();

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
                 Connection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();

            (head, String::from_utf8(request_body).unwrap())
        });

        (url, handle)
    }

    #[test]
    fn fetch_takes_first_five_in_order() {
        let posts = canned_client(&posts_json(8)).fetch_posts().unwrap();

        let ids: Vec<i32> = posts.iter().map(Post::id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(posts[2].title(), "title 3");
        assert_eq!(posts[4].body(), "body 5");
    }

    #[test]
    fn fetch_exactly_five() {
        assert_eq!(canned_client(&posts_json(5)).fetch_posts().unwrap().len(), 5);
    }

    #[test]
    fn fetch_fewer_than_five_fails() {
        let err = canned_client(&posts_json(3)).fetch_posts().unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn fetch_ignores_elements_after_the_fifth() {
        let body = posts_json(5).trim_end_matches(']').to_string() + r#","not a post"]"#;
        assert_eq!(canned_client(&body).fetch_posts().unwrap().len(), 5);
    }

    #[test]
    fn fetch_rejects_non_array() {
        assert!(canned_client(r#"{"id":1}"#).fetch_posts().is_err());
    }

    #[test]
    fn create_maps_response_fields() {
        let response = r#"{"title":"Hi","body":"There","userId":1,"id":101}"#;
        let transport = CannedTransport::new(response);
        let client = PostsClient::with_transport("http://test/posts", transport.clone());

        let post = client.create_post(&NewPost::new("Hi", "There", 1)).unwrap();
        assert_eq!(post.id(), 101);
        assert_eq!(post.title(), "Hi");
        assert_eq!(post.body(), "There");

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "http://test/posts");
        assert_eq!(sent[0].1, r#"{"title":"Hi","body":"There","userId":1}"#);
    }

    #[test]
    fn create_with_missing_id_fails() {
        let client = canned_client(r#"{"title":"Hi","body":"There"}"#);
        assert!(client.create_post(&NewPost::new("Hi", "There", 1)).is_err());
    }

    #[test]
    fn transport_errors_propagate() {
        let client = PostsClient::with_transport("http://test/posts", Arc::new(DownTransport));
        assert!(client.fetch_posts().is_err());
        assert!(client.create_post(&NewPost::new("a", "b", 1)).is_err());
    }

    #[test]
    fn atto_post_sends_json_content_type() {
        let (url, server) = serve_once("201 Created", r#"{"id":101,"title":"a","body":"b"}"#);

        let text = AttoTransport.post_json(&url, r#"{"title":"a"}"#).unwrap();
        let (head, body) = server.join().unwrap();

        assert!(head[0].starts_with("POST /posts "));
        let content_type: Vec<&str> = head
            .iter()
            .filter_map(|line| line.split_once(':'))
            .filter(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.trim())
            .collect();
        assert_eq!(content_type, vec![JSON_CONTENT_TYPE]);
        assert_eq!(body, r#"{"title":"a"}"#);
        assert_eq!(text, r#"{"id":101,"title":"a","body":"b"}"#);
    }

    #[test]
    fn atto_get_returns_body_on_success() {
        let (url, server) = serve_once("200 OK", "[]");

        assert_eq!(AttoTransport.get(&url).unwrap(), "[]");
        let (head, _) = server.join().unwrap();
        assert!(head[0].starts_with("GET /posts "));
    }

    #[test]
    fn atto_non_success_status_is_an_error() {
        let (url, server) = serve_once("404 Not Found", "{}");

        assert!(AttoTransport.get(&url).is_err());
        server.join().unwrap();

        let (url, server) = serve_once("500 Internal Server Error", "{}");
        assert!(AttoTransport.post_json(&url, "{}").is_err());
        server.join().unwrap();
    }
}
