//! Field tag grammar.
//!
//! Every bindable field carries a tag describing where its value comes from
//! and how it is serialized:
//!
//! ```text
//! <name>[,<origin>][,<style>][,required][,explode|implode][,json|xml]
//! ```
//!
//! Settings are applied left to right, so a later setting wins over an
//! earlier one on the same axis. Parsing is strict: any token that is not
//! part of the grammar is reported as [`TagError::UnknownSetting`], except
//! after `body`, where it is taken as a body format other than `json` or
//! `xml` and reported as [`TagError::UnsupportedFormat`].

use std::fmt;
use std::str::FromStr;

use crate::body::BodyFormat;
use crate::error::TagError;

/// Name that excludes a field from binding.
pub const EXCLUDED: &str = "-";

/// Part of the request a field is bound from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    Path,
    #[default]
    Query,
    Body,
    Header,
}

impl Origin {
    /// Tag token of the origin.
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Path => "path",
            Origin::Query => "query",
            Origin::Body => "body",
            Origin::Header => "header",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialization style of a query parameter.
///
/// See <https://swagger.io/docs/specification/serialization/#query>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    /// `?id=3,4,5`
    #[default]
    Form,
    /// `?id=3%204%205`
    SpaceDelimited,
    /// `?id=3|4|5`
    PipeDelimited,
    /// `?id[role]=admin&id[firstName]=Alex`
    DeepObject,
}

impl Style {
    /// Tag token of the style.
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Form => "form",
            Style::SpaceDelimited => "spaceDelimited",
            Style::PipeDelimited => "pipeDelimited",
            Style::DeepObject => "deepObject",
        }
    }

    /// Delimiter joining imploded values. Deep objects have none.
    pub fn delimiter(&self) -> Option<char> {
        match self {
            Style::Form => Some(','),
            Style::SpaceDelimited => Some(' '),
            Style::PipeDelimited => Some('|'),
            Style::DeepObject => None,
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query serialization applied to fields whose tag does not say otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    pub style: Style,
    /// `true` for `?id=1&id=2`, `false` for `?id=1,2`.
    pub exploded: bool,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self {
            style: Style::Form,
            exploded: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Setting {
    Required,
    Exploded(bool),
    Style(Style),
    Origin(Origin),
    Format(BodyFormat),
}

impl FromStr for Setting {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let setting = match s {
            "required" => Setting::Required,
            "explode" | "exploded" => Setting::Exploded(true),
            "implode" | "imploded" => Setting::Exploded(false),
            "form" => Setting::Style(Style::Form),
            "spaceDelimited" => Setting::Style(Style::SpaceDelimited),
            "pipeDelimited" => Setting::Style(Style::PipeDelimited),
            "deepObject" => Setting::Style(Style::DeepObject),
            "path" => Setting::Origin(Origin::Path),
            "query" => Setting::Origin(Origin::Query),
            "body" => Setting::Origin(Origin::Body),
            "header" => Setting::Origin(Origin::Header),
            "json" => Setting::Format(BodyFormat::Json),
            "xml" => Setting::Format(BodyFormat::Xml),
            _ => return Err(()),
        };
        Ok(setting)
    }
}

/// Binding instructions for one field, derived from its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// Binding key: query parameter, path parameter or header name.
    pub name: String,
    pub origin: Origin,
    pub style: Style,
    pub exploded: bool,
    pub required: bool,
    /// Declared body format. `None` means infer from the request.
    pub format: Option<BodyFormat>,
}

impl Descriptor {
    /// Parses the tag of the field named `ident`.
    ///
    /// Returns `Ok(None)` when the field is excluded with `-`. An empty name
    /// defaults to the lower-cased identifier.
    pub fn parse(tag: &str, ident: &str, policy: QueryPolicy) -> Result<Option<Self>, TagError> {
        let mut tokens = tag.split(',').map(str::trim);
        let name = tokens.next().unwrap_or_default();
        if name == EXCLUDED {
            return Ok(None);
        }

        let mut descriptor = Descriptor {
            name: if name.is_empty() {
                ident.to_lowercase()
            } else {
                name.to_string()
            },
            origin: Origin::default(),
            style: policy.style,
            exploded: policy.exploded,
            required: false,
            format: None,
        };

        for token in tokens {
            let setting = token.parse::<Setting>().map_err(|()| {
                // after `body`, a bare token names the body format
                if descriptor.origin == Origin::Body && !token.is_empty() {
                    TagError::UnsupportedFormat {
                        tag: tag.to_string(),
                        format: token.to_string(),
                    }
                } else {
                    TagError::UnknownSetting {
                        tag: tag.to_string(),
                        token: token.to_string(),
                    }
                }
            })?;
            descriptor.apply(setting);
        }

        Ok(Some(descriptor))
    }

    fn apply(&mut self, setting: Setting) {
        match setting {
            Setting::Required => self.required = true,
            Setting::Exploded(exploded) => self.exploded = exploded,
            Setting::Style(style) => {
                // naming a style implodes, except deep objects which are always exploded
                self.style = style;
                self.exploded = style == Style::DeepObject;
            }
            Setting::Origin(origin) => self.origin = origin,
            Setting::Format(format) => self.format = Some(format),
        }
    }

    /// Whether the field is a query parameter in `deepObject` style.
    pub fn is_deep(&self) -> bool {
        self.origin == Origin::Query && self.style == Style::DeepObject
    }
}
