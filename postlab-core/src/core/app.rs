use anyhow::Result;
use log::{error, info};
use poll_promise::Promise;

use crate::core::database::PostStore;
use crate::core::post::{NewPost, Post};
use crate::core::request::PostsClient;
use crate::core::storage::Config;

/// The text target a workflow reports into. Only touched from the thread
/// that owns the `PostsApp`.
pub trait TextDisplay {
    fn set_text(&mut self, text: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowKind {
    FetchList,
    CreateAndDisplay,
    CreateAndPersist,
}

impl WorkflowKind {
    pub const ALL: [WorkflowKind; 3] = [
        WorkflowKind::FetchList,
        WorkflowKind::CreateAndDisplay,
        WorkflowKind::CreateAndPersist,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WorkflowKind::FetchList => "fetch-list",
            WorkflowKind::CreateAndDisplay => "create-and-display",
            WorkflowKind::CreateAndPersist => "create-and-persist",
        }
    }

    pub fn start_text(&self) -> &'static str {
        match self {
            WorkflowKind::FetchList => "Loading data with GET...",
            WorkflowKind::CreateAndDisplay => "Sending POST request...",
            WorkflowKind::CreateAndPersist => "Sending POST request and saving result locally...",
        }
    }

    /// Body sent by the create workflows.
    pub fn payload(&self) -> Option<NewPost> {
        match self {
            WorkflowKind::FetchList => None,
            WorkflowKind::CreateAndDisplay => Some(NewPost::new(
                "Hello from Android",
                "This is a test post from our OOP lab",
                1,
            )),
            WorkflowKind::CreateAndPersist => Some(NewPost::new(
                "New Local Post",
                "This post is stored in SQLite too.",
                1,
            )),
        }
    }

    // network half, runs on the worker thread
    fn run(&self, client: &PostsClient) -> Result<Outcome> {
        match self.payload() {
            None => client.fetch_posts().map(Outcome::Posts),
            Some(draft) => client.create_post(&draft).map(Outcome::Created),
        }
    }
}

/// What the background half of a workflow hands back.
#[derive(Debug)]
pub enum Outcome {
    Posts(Vec<Post>),
    Created(Post),
}

struct RunningTask {
    kind: WorkflowKind,
    promise: Promise<Result<Outcome>>,
}

pub struct PostsApp<V: TextDisplay> {
    client: PostsClient,
    store: PostStore,
    display: V,
    tasks: Vec<RunningTask>,
}

impl<V: TextDisplay> PostsApp<V> {
    pub fn new(client: PostsClient, store: PostStore, display: V) -> Self {
        Self {
            client,
            store,
            display,
            tasks: Vec::new(),
        }
    }

    pub fn from_config(config: &Config, display: V) -> Self {
        Self::new(
            PostsClient::new(config.endpoint.clone()),
            PostStore::new(config.sqlite_file.clone()),
            display,
        )
    }

    pub fn display(&self) -> &V {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut V {
        &mut self.display
    }

    pub fn into_display(self) -> V {
        self.display
    }

    pub fn store(&self) -> &PostStore {
        &self.store
    }

    pub fn running(&self) -> usize {
        self.tasks.len()
    }

    /// Show the start text, then hand the network call to a worker thread.
    pub fn trigger(&mut self, kind: WorkflowKind) {
        self.display.set_text(kind.start_text());

        let client = self.client.clone();
        let promise = Promise::spawn_thread(kind.name(), move || kind.run(&client));
        info!("Started {} workflow", kind.name());
        self.tasks.push(RunningTask { kind, promise });
    }

    /// Finish every workflow whose network call is done. Returns how many finished.
    pub fn poll(&mut self) -> usize {
        let mut finished = 0;
        for task in std::mem::take(&mut self.tasks) {
            match task.promise.try_take() {
                Ok(result) => {
                    self.finish(task.kind, result);
                    finished += 1;
                }
                Err(promise) => self.tasks.push(RunningTask {
                    kind: task.kind,
                    promise,
                }),
            }
        }
        finished
    }

    /// Block until every running workflow has finished.
    pub fn wait(&mut self) {
        for task in std::mem::take(&mut self.tasks) {
            let result = task.promise.block_and_take();
            self.finish(task.kind, result);
        }
    }

    fn finish(&mut self, kind: WorkflowKind, result: Result<Outcome>) {
        let text = match result.and_then(|outcome| self.complete(kind, outcome)) {
            Ok(text) => {
                info!("Finished {} workflow", kind.name());
                text
            }
            Err(e) => {
                error!("{} workflow failed: {:#}", kind.name(), e);
                format!("Error: {:#}", e)
            }
        };
        self.display.set_text(&text);
    }

    fn complete(&self, kind: WorkflowKind, outcome: Outcome) -> Result<String> {
        match outcome {
            Outcome::Posts(posts) => Ok(render_list(&posts)),
            Outcome::Created(post) if kind == WorkflowKind::CreateAndPersist => {
                self.store.upsert(&post)?;
                Ok(format!("POST complete.\nSaved to SQLite DB:\n\n{}", post))
            }
            Outcome::Created(post) => Ok(format!("POST response:\n\n{}", post)),
        }
    }
}

fn render_list(posts: &[Post]) -> String {
    let mut text = String::from("GET response (first 5 posts):\n\n");
    for post in posts {
        text.push_str(&format!("{}\n\n", post));
    }
    text
}
