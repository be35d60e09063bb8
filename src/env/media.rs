//! Media query evaluation for the built-in hosts.
//!
//! Supports the grammar the screens compiler emits plus the common features:
//!
//! ```text
//! query-list  := query ("," query)*
//! query       := ["only" | "not"] type ("and" feature)* | feature ("and" feature)*
//! type        := "all" | "screen" | "print"
//! feature     := "(" name ":" value ")"
//! ```
//!
//! Features: `width`, `min-width`, `max-width`, `height`, `min-height`,
//! `max-height`, `orientation`, `prefers-color-scheme`. Unknown features never
//! match; a query that fails to parse never matches. An empty list matches.

// =============================================================================
// Media Types
// =============================================================================

bitflags::bitflags! {
    /// Media types a host can present as. `ALL` is every type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MediaTypes: u8 {
        const SCREEN = 1 << 0;
        const PRINT = 1 << 1;
        const ALL = Self::SCREEN.bits() | Self::PRINT.bits();
    }
}

impl MediaTypes {
    fn parse(ident: &str) -> Option<Self> {
        match ident.to_ascii_lowercase().as_str() {
            "all" => Some(Self::ALL),
            "screen" => Some(Self::SCREEN),
            "print" => Some(Self::PRINT),
            _ => None,
        }
    }
}

impl Default for MediaTypes {
    fn default() -> Self {
        Self::SCREEN
    }
}

/// User color-scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

// =============================================================================
// Features
// =============================================================================

/// The environment state a query is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaFeatures {
    /// Viewport width in px.
    pub width: f32,
    /// Viewport height in px.
    pub height: f32,
    pub media_type: MediaTypes,
    pub color_scheme: ColorScheme,
    /// Pixels per `em`/`rem`.
    pub font_size: f32,
    /// Pixels per `ch`.
    pub cell_width: f32,
}

impl MediaFeatures {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            media_type: MediaTypes::SCREEN,
            color_scheme: ColorScheme::Light,
            font_size: 16.0,
            cell_width: 8.0,
        }
    }
}

impl Default for MediaFeatures {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

// =============================================================================
// Parsed Query
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Unit {
    Px,
    Em,
    Ch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Length {
    value: f32,
    unit: Unit,
}

impl Length {
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let split = text
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
            .unwrap_or(text.len());
        let (number, unit) = text.split_at(split);
        let value: f32 = number.parse().ok()?;
        let unit = match unit.to_ascii_lowercase().as_str() {
            "" | "px" => Unit::Px,
            "em" | "rem" => Unit::Em,
            "ch" => Unit::Ch,
            _ => return None,
        };
        Some(Self { value, unit })
    }

    fn to_px(self, features: &MediaFeatures) -> f32 {
        match self.unit {
            Unit::Px => self.value,
            Unit::Em => self.value * features.font_size,
            Unit::Ch => self.value * features.cell_width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Range {
    Min,
    Max,
    Exact,
}

impl Range {
    fn test(self, actual: f32, bound: f32) -> bool {
        match self {
            Self::Min => actual >= bound,
            Self::Max => actual <= bound,
            Self::Exact => (actual - bound).abs() < f32::EPSILON,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Condition {
    Width(Range, Length),
    Height(Range, Length),
    Orientation(Orientation),
    ColorScheme(ColorScheme),
    Unknown,
}

impl Condition {
    fn parse(inner: &str) -> Self {
        let Some((name, value)) = inner.split_once(':') else {
            return Self::Unknown;
        };
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();

        let sized = |range: Range, height: bool| match Length::parse(value) {
            Some(len) if height => Self::Height(range, len),
            Some(len) => Self::Width(range, len),
            None => Self::Unknown,
        };

        match name.as_str() {
            "width" => sized(Range::Exact, false),
            "min-width" => sized(Range::Min, false),
            "max-width" => sized(Range::Max, false),
            "height" => sized(Range::Exact, true),
            "min-height" => sized(Range::Min, true),
            "max-height" => sized(Range::Max, true),
            "orientation" => match value.to_ascii_lowercase().as_str() {
                "portrait" => Self::Orientation(Orientation::Portrait),
                "landscape" => Self::Orientation(Orientation::Landscape),
                _ => Self::Unknown,
            },
            "prefers-color-scheme" => match value.to_ascii_lowercase().as_str() {
                "light" => Self::ColorScheme(ColorScheme::Light),
                "dark" => Self::ColorScheme(ColorScheme::Dark),
                _ => Self::Unknown,
            },
            _ => Self::Unknown,
        }
    }

    fn eval(&self, f: &MediaFeatures) -> bool {
        match *self {
            Self::Width(range, len) => range.test(f.width, len.to_px(f)),
            Self::Height(range, len) => range.test(f.height, len.to_px(f)),
            Self::Orientation(Orientation::Portrait) => f.height >= f.width,
            Self::Orientation(Orientation::Landscape) => f.width > f.height,
            Self::ColorScheme(scheme) => f.color_scheme == scheme,
            Self::Unknown => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct SingleQuery {
    negated: bool,
    media_type: Option<MediaTypes>,
    conditions: Vec<Condition>,
}

impl SingleQuery {
    fn eval(&self, f: &MediaFeatures) -> bool {
        let type_ok = self.media_type.is_none_or(|t| t.intersects(f.media_type));
        let result = type_ok && self.conditions.iter().all(|c| c.eval(f));
        result != self.negated
    }
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Ident(&'a str),
    Group(&'a str),
}

fn tokenize(text: &str) -> Option<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut rest = text.trim_start();
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('(') {
            let close = after.find(')')?;
            let inner = &after[..close];
            if inner.contains('(') {
                return None;
            }
            tokens.push(Token::Group(inner));
            rest = &after[close + 1..];
        } else {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '(' || c == ')')
                .unwrap_or(rest.len());
            if end == 0 {
                return None;
            }
            tokens.push(Token::Ident(&rest[..end]));
            rest = &rest[end..];
        }
        rest = rest.trim_start();
    }
    Some(tokens)
}

fn parse_single(text: &str) -> Option<SingleQuery> {
    let tokens = tokenize(text)?;
    let mut iter = tokens.into_iter();
    let mut query = SingleQuery { negated: false, media_type: None, conditions: Vec::new() };

    match iter.next()? {
        Token::Group(inner) => query.conditions.push(Condition::parse(inner)),
        Token::Ident(word) => {
            let word = match word.to_ascii_lowercase().as_str() {
                "not" => {
                    query.negated = true;
                    match iter.next()? {
                        Token::Ident(t) => t,
                        Token::Group(_) => return None,
                    }
                }
                "only" => match iter.next()? {
                    Token::Ident(t) => t,
                    Token::Group(_) => return None,
                },
                _ => word,
            };
            query.media_type = Some(MediaTypes::parse(word)?);
        }
    }

    while let Some(token) = iter.next() {
        match token {
            Token::Ident(word) if word.eq_ignore_ascii_case("and") => match iter.next()? {
                Token::Group(inner) => query.conditions.push(Condition::parse(inner)),
                Token::Ident(_) => return None,
            },
            _ => return None,
        }
    }

    Some(query)
}

/// A parsed media-query list.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaQuery {
    text: String,
    /// `None` entries failed to parse and never match.
    queries: Vec<Option<SingleQuery>>,
}

impl MediaQuery {
    /// Parse a query list. Never fails; bad parts simply never match.
    pub fn parse(text: &str) -> Self {
        let queries = if text.trim().is_empty() {
            Vec::new()
        } else {
            text.split(',').map(parse_single).collect()
        };
        Self { text: text.to_string(), queries }
    }

    /// The original query text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Evaluate against the given features.
    pub fn matches(&self, features: &MediaFeatures) -> bool {
        if self.queries.is_empty() {
            return true;
        }
        self.queries
            .iter()
            .any(|q| q.as_ref().is_some_and(|q| q.eval(features)))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn at(width: f32) -> MediaFeatures {
        MediaFeatures::new(width, 600.0)
    }

    #[test]
    fn test_min_width() {
        let q = MediaQuery::parse("(min-width: 640px)");
        assert!(q.matches(&at(640.0)));
        assert!(q.matches(&at(1000.0)));
        assert!(!q.matches(&at(639.0)));
    }

    #[test]
    fn test_min_and_max() {
        let q = MediaQuery::parse("(min-width: 100px) and (max-width: 200px)");
        assert!(!q.matches(&at(99.0)));
        assert!(q.matches(&at(150.0)));
        assert!(q.matches(&at(200.0)));
        assert!(!q.matches(&at(201.0)));
    }

    #[test]
    fn test_query_list_is_or() {
        let q = MediaQuery::parse("(max-width: 100px), (min-width: 300px)");
        assert!(q.matches(&at(50.0)));
        assert!(!q.matches(&at(200.0)));
        assert!(q.matches(&at(400.0)));
    }

    #[test]
    fn test_media_types() {
        let mut f = at(800.0);
        assert!(MediaQuery::parse("screen").matches(&f));
        assert!(!MediaQuery::parse("print").matches(&f));
        assert!(MediaQuery::parse("all").matches(&f));
        assert!(MediaQuery::parse("not print").matches(&f));
        assert!(MediaQuery::parse("only screen and (min-width: 700px)").matches(&f));
        f.media_type = MediaTypes::PRINT;
        assert!(MediaQuery::parse("print").matches(&f));
    }

    #[test]
    fn test_units() {
        let f = at(640.0);
        assert!(MediaQuery::parse("(min-width: 40em)").matches(&f));
        assert!(MediaQuery::parse("(min-width: 40rem)").matches(&f));
        assert!(MediaQuery::parse("(min-width: 80ch)").matches(&f));
        assert!(!MediaQuery::parse("(min-width: 81ch)").matches(&f));
        assert!(MediaQuery::parse("(width: 640)").matches(&f));
    }

    #[test]
    fn test_orientation_and_scheme() {
        let mut f = MediaFeatures::new(400.0, 800.0);
        assert!(MediaQuery::parse("(orientation: portrait)").matches(&f));
        assert!(!MediaQuery::parse("(orientation: landscape)").matches(&f));
        assert!(!MediaQuery::parse("(prefers-color-scheme: dark)").matches(&f));
        f.color_scheme = ColorScheme::Dark;
        assert!(MediaQuery::parse("(prefers-color-scheme: dark)").matches(&f));
    }

    #[test]
    fn test_invalid_never_matches() {
        let f = at(800.0);
        assert!(!MediaQuery::parse("(min-width: 10furlongs)").matches(&f));
        assert!(!MediaQuery::parse("(hover)").matches(&f));
        assert!(!MediaQuery::parse("tv").matches(&f));
        assert!(!MediaQuery::parse("(min-width: 1px").matches(&f));
        assert!(!MediaQuery::parse("(min-width: 1px) (max-width: 2px)").matches(&f));
        // a broken part does not poison the rest of the list
        assert!(MediaQuery::parse("garbage (x), (min-width: 1px)").matches(&f));
    }

    #[test]
    fn test_empty_matches_all() {
        assert!(MediaQuery::parse("").matches(&at(1.0)));
        assert_eq!(MediaQuery::parse("print").text(), "print");
    }
}
