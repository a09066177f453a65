//! Component tree of an iCalendar object (RFC 5545 §3.6).

use super::Property;
use super::names;

/// Component names the index distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Calendar,
    Event,
    Todo,
    Journal,
    FreeBusy,
    Timezone,
    Alarm,
    /// `X-` or IANA components without special meaning here.
    Unknown,
}

impl ComponentKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calendar => "VCALENDAR",
            Self::Event => "VEVENT",
            Self::Todo => "VTODO",
            Self::Journal => "VJOURNAL",
            Self::FreeBusy => "VFREEBUSY",
            Self::Timezone => "VTIMEZONE",
            Self::Alarm => "VALARM",
            Self::Unknown => "X-UNKNOWN",
        }
    }

    /// Maps a component name to its kind, ignoring ASCII case.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        [
            Self::Calendar,
            Self::Event,
            Self::Todo,
            Self::Journal,
            Self::FreeBusy,
            Self::Timezone,
            Self::Alarm,
        ]
        .into_iter()
        .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
        .unwrap_or(Self::Unknown)
    }

    /// `VEVENT`, `VTODO` and `VJOURNAL`: the kinds an index record can
    /// summarize.
    #[must_use]
    pub const fn is_schedulable(self) -> bool {
        matches!(self, Self::Event | Self::Todo | Self::Journal)
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A component with its properties and nested components.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Component {
    /// `None` for components built from a name the model does not know.
    pub kind: Option<ComponentKind>,
    /// Name as written in the object, upper-cased.
    pub name: String,
    pub properties: Vec<Property>,
    pub children: Vec<Component>,
}

impl Component {
    #[must_use]
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind: Some(kind),
            name: kind.as_str().to_owned(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn calendar() -> Self {
        Self::new(ComponentKind::Calendar)
    }

    #[must_use]
    pub fn event() -> Self {
        Self::new(ComponentKind::Event)
    }

    #[must_use]
    pub fn todo() -> Self {
        Self::new(ComponentKind::Todo)
    }

    #[must_use]
    pub fn journal() -> Self {
        Self::new(ComponentKind::Journal)
    }

    #[must_use]
    pub fn timezone() -> Self {
        Self::new(ComponentKind::Timezone)
    }

    pub fn add_property(&mut self, property: Property) {
        self.properties.push(property);
    }

    #[must_use]
    pub fn with_property(mut self, property: Property) -> Self {
        self.add_property(property);
        self
    }

    pub fn add_child(&mut self, child: Component) {
        self.children.push(child);
    }

    #[must_use]
    pub fn with_child(mut self, child: Component) -> Self {
        self.add_child(child);
        self
    }

    /// First property called `name` (ASCII case-insensitive).
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.property(names::UID)?.as_text()
    }

    /// Whether the component defines more occurrences than its own start:
    /// it carries a non-empty `RRULE` or `RDATE`.
    #[must_use]
    pub fn has_recurrence(&self) -> bool {
        [names::RRULE, names::RDATE]
            .into_iter()
            .filter_map(|name| self.property(name))
            .any(|p| !p.is_empty())
    }

    /// Direct children of the given kind, in order.
    pub fn children_of_kind(&self, kind: ComponentKind) -> impl Iterator<Item = &Component> {
        self.children.iter().filter(move |c| c.kind == Some(kind))
    }
}

/// One iCalendar object: a `VCALENDAR` root and its components.
#[derive(Debug, Clone, PartialEq)]
pub struct ICalendar {
    pub root: Component,
}

impl ICalendar {
    /// Creates an object with `VERSION:2.0` and the given `PRODID`.
    #[must_use]
    pub fn new(prodid: impl Into<String>) -> Self {
        let root = Component::calendar()
            .with_property(Property::text("VERSION", "2.0"))
            .with_property(Property::text("PRODID", prodid));
        Self { root }
    }

    /// Creates a default object holding `component`.
    #[must_use]
    pub fn with_component(component: Component) -> Self {
        let mut ical = Self::default();
        ical.add_component(component);
        ical
    }

    pub fn add_component(&mut self, component: Component) {
        self.root.add_child(component);
    }

    /// ## Summary
    /// Returns the component an index record summarizes.
    ///
    /// The first `VEVENT` wins, then the first `VTODO`, then the first
    /// `VJOURNAL`. Objects holding only time zones or unknown components
    /// have none.
    #[must_use]
    pub fn primary_component(&self) -> Option<&Component> {
        [ComponentKind::Event, ComponentKind::Todo, ComponentKind::Journal]
            .into_iter()
            .find_map(|kind| self.root.children_of_kind(kind).next())
    }
}

impl Default for ICalendar {
    fn default() -> Self {
        Self::new("-//Kunai//Kunai Calendar Index//EN")
    }
}
