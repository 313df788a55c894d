use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::process::{Command, ExitStatus, Stdio};
use tokio::task::JoinHandle;
use pixchat_core::content::{self, Segment};
use pixchat_core::error::Result as ChatResult;
use pixchat_core::{AskResponse, AssistantClient, ChatController, ChatError, Config, Identity, IdentitySelector};

/// Canned prompts offered from the header
pub const EXAMPLE_QUERIES: [&str; 6] = [
    "Show me all posts with images",
    "Get posts from user 1",
    "Show me user profiles",
    "Find recent posts",
    "List all places",
    "Who follows me?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Which popup, if any, is capturing keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Examples,
    Identities,
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub overlay: Overlay,

    // Message input
    pub query_input: String,
    pub query_cursor: usize, // cursor position in query_input, in chars

    // Chat view
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the chat area, set during render
    pub chat_total_lines: u16,
    pub follow_bottom: bool,
    pub chat_area: Option<Rect>,

    // Animation state
    pub animation_frame: u8, // 0-2 for the typing dots

    // Popups
    pub examples_state: ListState,
    pub identity_picker_state: ListState,

    // Conversation
    pub controller: ChatController,
    pub identities: IdentitySelector,
    pub client: AssistantClient,

    // In-flight requests
    pub ask_task: Option<JoinHandle<ChatResult<AskResponse>>>,
    pub identity_task: Option<JoinHandle<ChatResult<Vec<Identity>>>>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let client = AssistantClient::new(&config.server_url());

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            overlay: Overlay::None,

            query_input: String::new(),
            query_cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_total_lines: 0,
            follow_bottom: true,
            chat_area: None,

            animation_frame: 0,

            examples_state: ListState::default(),
            identity_picker_state: ListState::default(),

            controller: ChatController::new(),
            identities: IdentitySelector::new(),
            client,

            ask_task: None,
            identity_task: None,
        }
    }

    /// Fetch the identity list once in the background
    pub fn start_identity_fetch(&mut self) {
        let client = self.client.clone();
        self.identity_task = Some(tokio::spawn(async move { client.list_users().await }));
    }

    /// Send the typed question if the controller accepts it
    pub fn submit_query(&mut self) {
        let user_id = self.identities.selected_id();
        let Some(request) = self.controller.submit(&self.query_input, user_id) else {
            return;
        };

        self.query_input.clear();
        self.query_cursor = 0;
        self.follow_bottom = true;

        let client = self.client.clone();
        self.ask_task = Some(tokio::spawn(async move { client.ask(&request).await }));
    }

    /// Hand finished background requests back to the conversation state
    pub async fn poll_tasks(&mut self) {
        if self.ask_task.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(task) = self.ask_task.take() {
                let outcome = task.await.unwrap_or_else(|err| {
                    tracing::error!(error = %err, "ask task failed");
                    Err(ChatError::Task(err.to_string()))
                });
                self.controller.complete(outcome);
                self.follow_bottom = true;
            }
        }

        if self.identity_task.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(task) = self.identity_task.take() {
                match task.await {
                    Ok(Ok(users)) => {
                        tracing::debug!(count = users.len(), "loaded identities");
                        self.identities.set_identities(users);
                    }
                    Ok(Err(err)) => tracing::warn!(error = %err, "could not fetch identities"),
                    Err(err) => tracing::error!(error = %err, "identity task failed"),
                }
            }
        }
    }

    pub fn is_sending(&self) -> bool {
        self.controller.is_sending()
    }

    pub fn tick_animation(&mut self) {
        if self.is_sending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.max_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
        self.follow_bottom = self.chat_scroll >= max;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_bottom = false;
    }

    pub fn scroll_to_top(&mut self) {
        self.chat_scroll = 0;
        self.follow_bottom = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
        self.follow_bottom = true;
    }

    pub fn half_page(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }

    fn max_scroll(&self) -> u16 {
        self.chat_total_lines.saturating_sub(self.chat_height)
    }

    pub fn open_examples(&mut self) {
        self.examples_state.select(Some(0));
        self.overlay = Overlay::Examples;
    }

    pub fn examples_nav_down(&mut self) {
        let i = self.examples_state.selected().map_or(0, |i| (i + 1) % EXAMPLE_QUERIES.len());
        self.examples_state.select(Some(i));
    }

    pub fn examples_nav_up(&mut self) {
        let i = match self.examples_state.selected() {
            Some(0) | None => EXAMPLE_QUERIES.len() - 1,
            Some(i) => i - 1,
        };
        self.examples_state.select(Some(i));
    }

    /// Put the highlighted example into the input box
    pub fn use_selected_example(&mut self) {
        if let Some(example) = self.examples_state.selected().and_then(|i| EXAMPLE_QUERIES.get(i)) {
            self.query_input = example.to_string();
            self.query_cursor = self.query_input.chars().count();
            self.input_mode = InputMode::Editing;
        }
        self.overlay = Overlay::None;
    }

    /// The identity picker stays closed while a reply is pending
    pub fn open_identity_picker(&mut self) {
        if self.is_sending() || self.identities.identities().is_empty() {
            return;
        }
        let current = self
            .identities
            .selected_id()
            .and_then(|id| self.identities.identities().iter().position(|i| i.id == id))
            .unwrap_or(0);
        self.identity_picker_state.select(Some(current));
        self.overlay = Overlay::Identities;
    }

    pub fn identity_picker_nav_down(&mut self) {
        let len = self.identities.identities().len();
        if len > 0 {
            let i = self.identity_picker_state.selected().map_or(0, |i| (i + 1) % len);
            self.identity_picker_state.select(Some(i));
        }
    }

    pub fn identity_picker_nav_up(&mut self) {
        let len = self.identities.identities().len();
        if len > 0 {
            let i = match self.identity_picker_state.selected() {
                Some(0) | None => len - 1,
                Some(i) => i - 1,
            };
            self.identity_picker_state.select(Some(i));
        }
    }

    pub fn select_identity(&mut self) {
        let picked = self
            .identity_picker_state
            .selected()
            .and_then(|i| self.identities.identities().get(i))
            .map(|identity| identity.id);

        if let Some(id) = picked {
            if !self.is_sending() && self.identities.select(id) {
                tracing::debug!(user_id = id, "identity selected");
            }
        }
        self.overlay = Overlay::None;
    }

    /// Most recent image in the conversation: gallery first, then inline markup
    pub fn latest_image_url(&self) -> Option<String> {
        self.controller
            .messages()
            .iter()
            .rev()
            .filter(|message| !message.is_user())
            .find_map(|message| {
                message
                    .gallery()
                    .last()
                    .map(|image| image.url.clone())
                    .or_else(|| {
                        content::parse(&message.content)
                            .into_iter()
                            .rev()
                            .find_map(|segment| match segment {
                                Segment::Image { url, .. } => Some(url),
                                Segment::Text(_) => None,
                            })
                    })
            })
    }

    pub fn open_latest_image(&self) {
        match self.latest_image_url() {
            Some(url) => {
                let opener = if cfg!(target_os = "macos") { "open" } else { "xdg-open" };
                open_with(opener, url);
            }
            None => tracing::debug!("no image to open"),
        }
    }
}

/// Run the platform opener off the event loop and wait for it to exit
fn open_with(opener: &'static str, url: String) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || match run_opener(opener, &url) {
        Ok(status) if !status.success() => {
            tracing::warn!(%status, %url, "image opener exited with an error");
        }
        Ok(_) => {}
        Err(err) => tracing::warn!(error = %err, %url, "failed to open image"),
    })
}

fn run_opener(opener: &str, url: &str) -> std::io::Result<ExitStatus> {
    Command::new(opener)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
}
