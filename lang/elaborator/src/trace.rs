//! Trace classes
//!
//! Traces are recorded per class. Classes are hierarchical names, and enabling a class
//! also enables all of its sub-classes: enabling `Meta.isLevelDefEq` enables `Meta.isLevelDefEq.step`.
//!
//! Every recorded entry is also forwarded to the `log` facade at trace level, with the class as target.

use lumen_lang_ast::Name;

pub mod classes {
    pub const IS_LEVEL_DEF_EQ: &str = "Meta.isLevelDefEq";
    pub const STEP: &str = "Meta.isLevelDefEq.step";
    pub const STUCK: &str = "Meta.isLevelDefEq.stuck";
    pub const POSTPONED: &str = "Meta.isLevelDefEq.postponed";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub class: Name,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct TraceRegistry {
    enabled: Vec<Name>,
    entries: Vec<TraceEntry>,
}

impl TraceRegistry {
    pub fn enable(&mut self, class: &str) {
        let class = Name::from(class);
        if !self.enabled.contains(&class) {
            self.enabled.push(class);
        }
    }

    pub fn disable(&mut self, class: &str) {
        let class = Name::from(class);
        self.enabled.retain(|c| *c != class);
    }

    pub fn is_enabled(&self, class: &str) -> bool {
        let class = Name::from(class);
        self.enabled.iter().any(|c| c.is_prefix_of(&class))
    }

    /// Record a trace message. The message is only computed if the class is enabled.
    pub fn add<F: FnOnce() -> String>(&mut self, class: &str, message: F) {
        if !self.is_enabled(class) {
            return;
        }
        let message = message();
        log::trace!(target: class, "{message}");
        self.entries.push(TraceEntry { class: Name::from(class), message });
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Messages recorded for exactly the given class.
    pub fn messages(&self, class: &str) -> Vec<&str> {
        let class = Name::from(class);
        self.entries.iter().filter(|e| e.class == class).map(|e| e.message.as_str()).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn enabling_a_class_enables_subclasses() {
        let mut traces = TraceRegistry::default();
        traces.enable(classes::IS_LEVEL_DEF_EQ);
        assert!(traces.is_enabled(classes::STEP));
        assert!(traces.is_enabled(classes::STUCK));
        assert!(!traces.is_enabled("Meta.isDefEq"));
    }

    #[test]
    fn disabled_classes_are_not_formatted() {
        let mut traces = TraceRegistry::default();
        traces.enable(classes::STUCK);
        traces.add(classes::STEP, || panic!("message of a disabled class was computed"));
        traces.add(classes::STUCK, || "?u.0 =?= u".to_owned());
        assert_eq!(traces.messages(classes::STUCK), vec!["?u.0 =?= u"]);
        assert_eq!(traces.entries().len(), 1);
    }
}
