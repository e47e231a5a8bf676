//! Name-based heuristics, the same keyword-matching style as
//! `features/effect_analysis/infrastructure/patterns`, retargeted from
//! effect inference to structural design-pattern recognition.

use regex::Regex;

use super::domain::DesignPattern;

fn matches_any(re: &Regex, candidates: &[&str]) -> bool {
    candidates.iter().any(|c| re.is_match(c))
}

/// Classifies a class by its own name and its methods' names. A class
/// can match more than one pattern (e.g. a factory that is also a
/// singleton).
pub fn detect_patterns(entity_name: &str, method_names: &[String]) -> Vec<DesignPattern> {
    let singleton_name = Regex::new(r"(?i)singleton").unwrap();
    let singleton_method = Regex::new(r"(?i)^(get_?)?instance$").unwrap();
    let factory_name = Regex::new(r"(?i)factory$").unwrap();
    let factory_method = Regex::new(r"(?i)^(create|make|build)_?\w*$").unwrap();
    let observer_name = Regex::new(r"(?i)(observer|listener|subscriber)$").unwrap();
    let observer_method = Regex::new(r"(?i)^(notify|subscribe|unsubscribe|on_event|update)$").unwrap();

    let methods: Vec<&str> = method_names.iter().map(String::as_str).collect();
    let mut found = Vec::new();

    if singleton_name.is_match(entity_name) || matches_any(&singleton_method, &methods) {
        found.push(DesignPattern::Singleton);
    }
    if factory_name.is_match(entity_name) || matches_any(&factory_method, &methods) {
        found.push(DesignPattern::Factory);
    }
    if observer_name.is_match(entity_name) || matches_any(&observer_method, &methods) {
        found.push(DesignPattern::Observer);
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_singleton_by_method_name() {
        let found = detect_patterns("ConfigManager", &["get_instance".to_string()]);
        assert_eq!(found, vec![DesignPattern::Singleton]);
    }

    #[test]
    fn detects_factory_by_name_suffix() {
        let found = detect_patterns("WidgetFactory", &[]);
        assert_eq!(found, vec![DesignPattern::Factory]);
    }

    #[test]
    fn detects_observer_by_notify_method() {
        let found = detect_patterns("PriceWatcher", &["notify".to_string(), "subscribe".to_string()]);
        assert_eq!(found, vec![DesignPattern::Observer]);
    }

    #[test]
    fn plain_class_matches_nothing() {
        let found = detect_patterns("UserRepository", &["save".to_string(), "find_by_id".to_string()]);
        assert!(found.is_empty());
    }

    #[test]
    fn class_can_match_multiple_patterns() {
        let found = detect_patterns("ConnectionPoolFactory", &["get_instance".to_string()]);
        assert_eq!(found.len(), 2);
        assert!(found.contains(&DesignPattern::Singleton));
        assert!(found.contains(&DesignPattern::Factory));
    }
}
