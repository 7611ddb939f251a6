use serde::{Deserialize, Serialize};

/// Duration of the fade-out before new panel content is injected.
pub const FADE_OUT_MS: u64 = 150;
/// Duration the transition class stays on after content is injected.
pub const SETTLE_MS: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Home,
    Weight,
    Assessment,
    Chat,
}

impl Tab {
    /// Unknown or empty names resolve to the home tab, matching the
    /// default for empty history state.
    pub fn parse(name: &str) -> Tab {
        match name.trim().to_lowercase().as_str() {
            "weight" => Tab::Weight,
            "assessment" => Tab::Assessment,
            "chat" => Tab::Chat,
            _ => Tab::Home,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Home => "home",
            Tab::Weight => "weight",
            Tab::Assessment => "assessment",
            Tab::Chat => "chat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    /// Switching to the already-active tab is a no-op.
    Same,
    Moved { from: Tab, to: Tab },
}

/// Single-panel navigation state. Transitions are applied atomically under
/// the state mutex, so a second switch cannot interleave with the first.
#[derive(Debug, Clone)]
pub struct Navigator {
    pub current: Tab,
    pub previous: Option<Tab>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            current: Tab::Home,
            previous: None,
        }
    }
}

impl Navigator {
    pub fn switch(&mut self, to: Tab) -> Switch {
        if self.current == to {
            return Switch::Same;
        }
        let from = self.current;
        self.previous = Some(from);
        self.current = to;
        Switch::Moved { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_tab_is_a_no_op() {
        let mut nav = Navigator::default();
        assert_eq!(nav.switch(Tab::Home), Switch::Same);
        assert_eq!(nav.current, Tab::Home);
        assert_eq!(nav.previous, None);
    }

    #[test]
    fn switch_records_previous_tab() {
        let mut nav = Navigator::default();
        let moved = nav.switch(Tab::Chat);
        assert_eq!(
            moved,
            Switch::Moved {
                from: Tab::Home,
                to: Tab::Chat
            }
        );
        assert_eq!(nav.current, Tab::Chat);
        assert_eq!(nav.previous, Some(Tab::Home));

        nav.switch(Tab::Weight);
        assert_eq!(nav.previous, Some(Tab::Chat));
    }

    #[test]
    fn unknown_names_default_to_home() {
        assert_eq!(Tab::parse("weight"), Tab::Weight);
        assert_eq!(Tab::parse("ASSESSMENT"), Tab::Assessment);
        assert_eq!(Tab::parse(""), Tab::Home);
        assert_eq!(Tab::parse("settings"), Tab::Home);
    }
}
