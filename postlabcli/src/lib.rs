pub use crate::app::{resolve_config, PostsCliApp, TerminalDisplay};

mod app {
    use anyhow::Result;
    use log::warn;
    use postlab_core::{Config, PostsApp, TextDisplay, WorkflowKind};
    use std::io::{self, BufRead, Write};
    use std::path::PathBuf;

    /// Build the config from command line overrides. The platform config
    /// directory is only looked up when no database file is given.
    pub fn resolve_config(endpoint: Option<String>, database: Option<PathBuf>) -> Result<Config> {
        let config = match database {
            Some(database) => Config::for_database(database)?,
            None => Config::new()?,
        };
        Ok(match endpoint {
            Some(endpoint) => config.with_endpoint(endpoint),
            None => config,
        })
    }

    /// Prints every text the workflows set, one block per update.
    pub struct TerminalDisplay<W: Write> {
        out: W,
    }

    impl<W: Write> TerminalDisplay<W> {
        pub fn new(out: W) -> Self {
            Self { out }
        }

        pub fn writer(&mut self) -> &mut W {
            &mut self.out
        }

        pub fn into_inner(self) -> W {
            self.out
        }
    }

    impl<W: Write> TextDisplay for TerminalDisplay<W> {
        fn set_text(&mut self, text: &str) {
            if let Err(e) = writeln!(self.out, "{}\n", text).and_then(|_| self.out.flush()) {
                warn!("Failed to write to terminal: {}", e);
            }
        }
    }

    pub struct PostsCliApp<W: Write> {
        app: PostsApp<TerminalDisplay<W>>,
    }

    impl PostsCliApp<io::Stdout> {
        pub fn new(config: &Config) -> Self {
            Self {
                app: PostsApp::from_config(config, TerminalDisplay::new(io::stdout())),
            }
        }
    }

    impl<W: Write> PostsCliApp<W> {
        pub fn with_app(app: PostsApp<TerminalDisplay<W>>) -> Self {
            Self { app }
        }

        pub fn app(&self) -> &PostsApp<TerminalDisplay<W>> {
            &self.app
        }

        pub fn into_app(self) -> PostsApp<TerminalDisplay<W>> {
            self.app
        }

        pub fn run_workflow(&mut self, kind: WorkflowKind) {
            self.app.trigger(kind);
            self.app.wait();
        }

        // start all three before waiting on any of them
        pub fn run_all(&mut self) {
            for kind in WorkflowKind::ALL {
                self.app.trigger(kind);
            }
            self.app.wait();
        }

        pub fn show_saved(&mut self) -> Result<()> {
            let posts = self.app.store().read_all()?;
            let text = if posts.is_empty() {
                "No saved posts.".to_string()
            } else {
                let mut text = format!("Saved posts ({}):\n\n", posts.len());
                for post in &posts {
                    text.push_str(&format!("{}\n\n", post));
                }
                text
            };
            self.app.display_mut().set_text(text.trim_end());
            Ok(())
        }

        fn show_menu(&mut self) -> io::Result<()> {
            let out = self.app.display_mut().writer();
            writeln!(out, "\n=== Postlab - Posts API Client ===")?;
            writeln!(out)?;
            writeln!(out, "1. Get list (GET)")?;
            writeln!(out, "2. Send POST request")?;
            writeln!(out, "3. Send POST request and save")?;
            writeln!(out, "4. Show saved posts")?;
            writeln!(out, "5. Exit")?;
            write!(out, "\nSelect an option (1-5): ")?;
            out.flush()
        }

        pub fn run<R: BufRead>(&mut self, mut input: R) -> Result<()> {
            loop {
                self.show_menu()?;

                let mut line = String::new();
                if input.read_line(&mut line)? == 0 {
                    break;
                }

                match line.trim() {
                    "1" => self.run_workflow(WorkflowKind::FetchList),
                    "2" => self.run_workflow(WorkflowKind::CreateAndDisplay),
                    "3" => self.run_workflow(WorkflowKind::CreateAndPersist),
                    "4" => {
                        if let Err(e) = self.show_saved() {
                            self.app.display_mut().set_text(&format!("Error: {:#}", e));
                        }
                    }
                    "5" => {
                        writeln!(self.app.display_mut().writer(), "Exiting Postlab...")?;
                        break;
                    }
                    _ => {
                        let out = self.app.display_mut().writer();
                        writeln!(out, "Invalid option. Please select 1-5.")?;
                    }
                }
            }

            Ok(())
        }
    }

}
