//! Leaf elements, group nodes and the declared settings schema.
//!
//! The schema is a tree: ordered groups holding ordered leaf elements and
//! child groups. Declaration order is load-bearing: both the admin UI and
//! the persisted document emit keys in this order.

use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::constants::APP_NAME;
use crate::value::ConfigValue;

/// Semantic/UI type tag of a leaf element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Text,
    Number,
    Boolean,
    Password,
    Select,
    MultiSelect,
    LongText,
    /// Value stored as a hash of the submitted secret.
    Bcrypt,
    /// Toggle that enables/disables the elements listed in `target`.
    Enable,
    /// Auto-vivified leaves start hidden until someone attaches schema metadata.
    #[default]
    Hidden,
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// A single named setting: schema metadata, an optional declared default and
/// an optional live value.
///
/// The effective value is `value` when set, else `default`. Serialization
/// mirrors what the rendering layer expects: `name` goes out as `label`,
/// `kind` as `type`, and empty metadata is omitted while `default`/`value`
/// are always present (`null` meaning unset).
#[derive(Debug, Clone, Default, Serialize)]
pub struct Element {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "label")]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub placeholder: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pattern: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target: Vec<String>,
    pub readonly: bool,
    pub default: Option<ConfigValue>,
    pub value: Option<ConfigValue>,
    #[serde(rename = "multi", skip_serializing_if = "is_false")]
    pub multi_value: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub datalist: Vec<String>,
    pub required: bool,
    /// Declaration index among siblings.
    #[serde(skip)]
    pub order: usize,
}

impl Element {
    pub fn new(name: impl Into<String>, kind: ElementKind) -> Self {
        Element {
            name: name.into(),
            kind,
            ..Element::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = text.into();
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(ToString::to_string).collect();
        self
    }

    pub fn target(mut self, target: &[&str]) -> Self {
        self.target = target.iter().map(ToString::to_string).collect();
        self
    }

    pub fn datalist(mut self, datalist: &[&str]) -> Self {
        self.datalist = datalist.iter().map(ToString::to_string).collect();
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn multi(mut self) -> Self {
        self.multi_value = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<ConfigValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn value(mut self, value: impl Into<ConfigValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// The live value if set, else the declared default.
    pub fn effective(&self) -> Option<&ConfigValue> {
        self.value.as_ref().or(self.default.as_ref())
    }
}

/// Shared, lock-guarded leaf slot.
///
/// Elements live behind an `Arc` so cached resolutions stay valid when the
/// surrounding `Vec` grows or reallocates.
pub type ElementCell = Arc<RwLock<Element>>;

/// A named container of leaf elements and child groups.
#[derive(Debug, Default)]
pub struct Group {
    pub title: String,
    pub elements: Vec<ElementCell>,
    pub children: Vec<Group>,
}

impl Group {
    pub fn new(title: impl Into<String>) -> Self {
        Group {
            title: title.into(),
            elements: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append a leaf in declaration order.
    pub fn element(mut self, mut element: Element) -> Self {
        element.order = self.elements.len();
        self.elements.push(Arc::new(RwLock::new(element)));
        self
    }

    /// Append a child group in declaration order.
    pub fn child(mut self, group: Group) -> Self {
        self.children.push(group);
        self
    }
}

/// The declared schema: every setting known at process start, with its UI
/// metadata and defaults. Plugins register anything beyond this lazily
/// through [`crate::ConfigStore::get`].
pub fn declared_schema() -> Vec<Group> {
    use ElementKind::{Bcrypt, Boolean, Enable, LongText, Number, Password, Select, Text};

    let log_level_default = std::env::var("LOG_LEVEL")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "INFO".to_string());

    vec![
        Group::new("general")
            .element(
                Element::new("name", Text)
                    .default_value(APP_NAME)
                    .description("Name as shown in the UI")
                    .placeholder(format!("Default: \"{APP_NAME}\"")),
            )
            .element(
                Element::new("port", Number)
                    .default_value(8334)
                    .description("Port on which the application is available.")
                    .placeholder("Default: 8334"),
            )
            .element(
                Element::new("host", Text)
                    .description("The host people need to use to access this server")
                    .placeholder("Eg: \"files.yourcompany.com\""),
            )
            .element(
                Element::new("secret_key", Password)
                    .required()
                    .pattern("[a-zA-Z0-9]{16}")
                    .description(
                        "The key that's used to encrypt and decrypt content. Update this setting \
                         will invalidate existing user sessions and shared links, use with caution!",
                    ),
            )
            .element(
                Element::new("force_ssl", Boolean).description(
                    "Enable the web security mechanism called 'Strict Transport Security'",
                ),
            )
            .element(
                Element::new("editor", Select)
                    .default_value("emacs")
                    .options(&["base", "emacs", "vim"])
                    .description("Keybinding to be use in the editor. Default: \"emacs\""),
            )
            .element(
                Element::new("logout", Text)
                    .default_value("")
                    .description("Redirection URL whenever user click on the logout button"),
            )
            .element(
                Element::new("display_hidden", Boolean)
                    .default_value(false)
                    .description("Should files starting with a dot be visible by default?"),
            )
            .element(
                Element::new("refresh_after_upload", Boolean)
                    .default_value(false)
                    .description("Refresh directory listing after upload"),
            )
            .element(
                Element::new("upload_button", Boolean)
                    .default_value(false)
                    .description("Display the upload button on any device"),
            )
            .element(
                Element::new("upload_pool_size", Number)
                    .default_value(15)
                    .description("Maximum number of files upload in parallel. Default: 15"),
            )
            .element(
                Element::new("upload_chunk_size", Number)
                    .default_value(0)
                    .description("Size of Chunks for Uploads in MB."),
            )
            .element(
                Element::new("buffer_size", Select)
                    .default_value("medium")
                    .options(&["small", "medium", "large"])
                    .description(
                        "I/O buffer size for transfers. Larger buffers boost throughput on \
                         20 GbE+ networks but use more memory.",
                    ),
            )
            .element(
                Element::new("filepage_default_view", Select)
                    .default_value("grid")
                    .options(&["list", "grid"])
                    .description("Default layout for files and folder on the file page"),
            )
            .element(
                Element::new("filepage_default_sort", Select)
                    .default_value("type")
                    .options(&["type", "date", "name"])
                    .description("Default order for files and folder on the file page"),
            )
            .element(
                Element::new("cookie_timeout", Number)
                    .default_value(60 * 24 * 7)
                    .description(
                        "Authentication Cookie expiration in minutes. Default: \
                         60 * 24 * 7 = 1 week",
                    ),
            )
            .element(
                Element::new("extended_session", Boolean)
                    .default_value(false)
                    .description("Store extra auth data in session"),
            )
            .element(
                Element::new("custom_css", LongText)
                    .default_value("")
                    .description("Set custom css code for your instance"),
            ),
        Group::new("features")
            .child(
                Group::new("api").element(
                    Element::new("enable", Boolean)
                        .default_value(true)
                        .description("Enable/Disable the API"),
                ),
            )
            .child(
                Group::new("share")
                    .element(
                        Element::new("enable", Boolean)
                            .default_value(true)
                            .description("Enable/Disable the share feature"),
                    )
                    .element(
                        Element::new("default_access", Select)
                            .default_value("editor")
                            .options(&["editor", "viewer"])
                            .description("Default access for shared links"),
                    )
                    .element(
                        Element::new("redirect", Text)
                            .placeholder("redirection URL")
                            .description(
                                "When set, shared links will perform a redirection to another \
                                 link. Example: https://example.com?full_path={{path}}",
                            ),
                    ),
            )
            .child(
                Group::new("protection")
                    .element(
                        Element::new("iframe", Text).default_value("").description(
                            "list of domains who can use the application from an iframe. \
                             eg: https://example.com",
                        ),
                    )
                    .element(
                        Element::new("enable_chromecast", Boolean)
                            .default_value(true)
                            .description(
                                "Enable users to stream content on a chromecast device.",
                            ),
                    )
                    .element(
                        Element::new("signature", Text).default_value("").description(
                            "Enforce signature when using URL parameters in the \
                             authentication process",
                        ),
                    ),
            ),
        Group::new("log")
            .element(
                Element::new("enable", Enable)
                    .target(&["log_level"])
                    .default_value(true),
            )
            .element(
                Element::new("level", Select)
                    .id("log_level")
                    .default_value(log_level_default)
                    .options(&["DEBUG", "INFO", "WARNING", "ERROR"])
                    .description(
                        "Default: \"INFO\". This setting determines the level of detail at \
                         which log events are written to the log file",
                    ),
            )
            .element(
                Element::new("telemetry", Boolean)
                    .default_value(false)
                    .description(
                        "We won't share anything with any third party. This will only be \
                         used to improve our software",
                    ),
            ),
        Group::new("email")
            .element(
                Element::new("server", Text)
                    .default_value("smtp.gmail.com")
                    .description("Address of the SMTP email server.")
                    .placeholder("Default: smtp.gmail.com"),
            )
            .element(
                Element::new("port", Number)
                    .default_value(587)
                    .description("Port of the SMTP email server. Eg: 587")
                    .placeholder("Default: 587"),
            )
            .element(
                Element::new("username", Text)
                    .description("The username for authenticating to the SMTP server.")
                    .placeholder("Eg: username@gmail.com"),
            )
            .element(
                Element::new("password", Password)
                    .description("The password associated with the SMTP username.")
                    .placeholder("Eg: Your google password"),
            )
            .element(
                Element::new("from", Text)
                    .description("Email address visible on sent messages.")
                    .placeholder("Eg: username@gmail.com"),
            ),
        Group::new("auth").element(
            Element::new("admin", Bcrypt)
                .default_value("")
                .description("Password of the admin section."),
        ),
    ]
}

// =============================================================================
// Tests
// =============================================================================
