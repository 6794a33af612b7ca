use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    SystemError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: &'static str,
    pub body: String,
    pub role: Role,
}

impl Message {
    pub fn user(body: impl Into<String>) -> Self {
        Self {
            sender: "You",
            body: body.into(),
            role: Role::User,
        }
    }

    pub fn assistant(body: impl Into<String>) -> Self {
        Self {
            sender: "Gemini AI",
            body: body.into(),
            role: Role::Assistant,
        }
    }

    pub fn system_error(body: impl Into<String>) -> Self {
        Self {
            sender: "System",
            body: body.into(),
            role: Role::SystemError,
        }
    }
}

/// How one role is drawn in the transcript.
#[derive(Debug, Clone, Copy)]
pub struct RoleStyle {
    pub icon: &'static str,
    pub label: Style,
    pub body: Style,
    /// Render `**bold**` spans in the body.
    pub markdown: bool,
}

const USER_STYLE: RoleStyle = RoleStyle {
    icon: "👤",
    label: Style::new().fg(Color::Rgb(0x1a, 0x52, 0x76)).add_modifier(Modifier::BOLD),
    body: Style::new().fg(Color::Rgb(0x2c, 0x3e, 0x50)),
    markdown: false,
};

const ASSISTANT_STYLE: RoleStyle = RoleStyle {
    icon: "🤖",
    label: Style::new().fg(Color::Rgb(0x27, 0xae, 0x60)).add_modifier(Modifier::BOLD),
    body: Style::new().fg(Color::Rgb(0x34, 0x49, 0x5e)),
    markdown: true,
};

const SYSTEM_ERROR_STYLE: RoleStyle = RoleStyle {
    icon: "⚠",
    label: Style::new().fg(Color::Rgb(0xe7, 0x4c, 0x3c)).add_modifier(Modifier::BOLD),
    body: Style::new().fg(Color::Rgb(0xe7, 0x4c, 0x3c)).add_modifier(Modifier::ITALIC),
    markdown: false,
};

impl Role {
    pub fn style(self) -> &'static RoleStyle {
        match self {
            Role::User => &USER_STYLE,
            Role::Assistant => &ASSISTANT_STYLE,
            Role::SystemError => &SYSTEM_ERROR_STYLE,
        }
    }
}

/// Append-only message log plus its scroll position.
///
/// While `follow` is set the view is pinned to the newest block; the actual
/// offset is resolved at render time once the wrapped height is known.
#[derive(Debug)]
pub struct Transcript {
    messages: Vec<Message>,
    scroll: u16,
    follow: bool,
    // last rendered geometry, for page sizes and clamping
    view_height: u16,
    content_height: u16,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            scroll: 0,
            follow: true,
            view_height: 0,
            content_height: 0,
        }
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        self.follow = true;
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.scroll = 0;
        self.follow = true;
        self.content_height = 0;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    fn max_scroll(&self) -> u16 {
        self.content_height.saturating_sub(self.view_height)
    }

    /// Record the geometry of the frame just drawn and return the offset to
    /// render with.
    pub fn layout(&mut self, content_height: u16, view_height: u16) -> u16 {
        self.content_height = content_height;
        self.view_height = view_height;
        if self.follow {
            self.scroll = self.max_scroll();
        } else {
            self.scroll = self.scroll.min(self.max_scroll());
        }
        self.scroll
    }

    pub fn scroll_up(&mut self, lines: u16) {
        if self.follow {
            self.scroll = self.max_scroll();
        }
        self.scroll = self.scroll.saturating_sub(lines);
        self.follow = self.scroll >= self.max_scroll();
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines).min(self.max_scroll());
        self.follow = self.scroll >= self.max_scroll();
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.view_height.saturating_sub(1).max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.view_height.saturating_sub(1).max(1));
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
        self.follow = self.max_scroll() == 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow = true;
        self.scroll = self.max_scroll();
    }
}
