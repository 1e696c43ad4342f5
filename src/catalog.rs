//! Static grade, subject and topic catalogs

/// A school grade the learner can pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassInfo {
    pub id: u8,
    pub label: &'static str,
}

/// A subject card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    pub id: &'static str,
    pub name: &'static str,
    /// Icon glyph name
    pub icon: &'static str,
    /// Accent colour name
    pub color: &'static str,
}

/// A topic that launches the lab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topic {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const CLASSES: [ClassInfo; 8] = [
    ClassInfo { id: 5, label: "5" },
    ClassInfo { id: 6, label: "6" },
    ClassInfo { id: 7, label: "7" },
    ClassInfo { id: 8, label: "8" },
    ClassInfo { id: 9, label: "9" },
    ClassInfo { id: 10, label: "10" },
    ClassInfo { id: 11, label: "11" },
    ClassInfo { id: 12, label: "12" },
];

pub const SUBJECTS: [Subject; 6] = [
    Subject { id: "math", name: "Mathematics", icon: "Calculator", color: "blue" },
    Subject { id: "science", name: "Science", icon: "Atom", color: "green" },
    Subject { id: "social", name: "Social Science", icon: "Globe2", color: "red" },
    Subject { id: "english", name: "English", icon: "BookOpen", color: "purple" },
    Subject { id: "arts", name: "Fine Arts", icon: "Music", color: "pink" },
    Subject { id: "cs", name: "Computer Science", icon: "Code", color: "teal" },
];

const SCIENCE_TOPICS: [Topic; 4] = [
    Topic {
        id: "rutherford",
        name: "Rutherford's Atomic Model",
        description: "The Alpha Particle Scattering Experiment that changed physics.",
    },
    Topic {
        id: "chemical_rxns",
        name: "Chemical Reactions",
        description: "Balancing equations and types of reactions.",
    },
    Topic {
        id: "periodic_table",
        name: "Periodic Classification",
        description: "Evolution and modern periodic trends.",
    },
    Topic {
        id: "life_processes",
        name: "Life Processes",
        description: "Fundamentals of nutrition, respiration, and transport.",
    },
];

const MATH_TOPICS: [Topic; 2] = [
    Topic {
        id: "trig",
        name: "Trigonometry",
        description: "Ratios, identities, and heights & distances.",
    },
    Topic {
        id: "quadratics",
        name: "Quadratic Equations",
        description: "Nature of roots and application problems.",
    },
];

/// Topics for a subject (empty when the subject has none yet)
pub fn topics_for(subject_id: &str) -> &'static [Topic] {
    match subject_id {
        "science" => &SCIENCE_TOPICS,
        "math" => &MATH_TOPICS,
        _ => &[],
    }
}

pub fn find_class(id: u8) -> Option<ClassInfo> {
    CLASSES.iter().copied().find(|c| c.id == id)
}

pub fn find_subject(id: &str) -> Option<Subject> {
    SUBJECTS.iter().copied().find(|s| s.id == id)
}

pub fn find_topic(subject_id: &str, topic_id: &str) -> Option<Topic> {
    topics_for(subject_id).iter().copied().find(|t| t.id == topic_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_five_to_twelve() {
        let ids: Vec<u8> = CLASSES.iter().map(|c| c.id).collect();
        assert_eq!(ids, (5..=12).collect::<Vec<u8>>());
        assert!(CLASSES.iter().all(|c| c.label == c.id.to_string()));
    }

    #[test]
    fn test_topic_lookup() {
        assert_eq!(topics_for("science").len(), 4);
        assert_eq!(topics_for("math").len(), 2);
        assert!(topics_for("arts").is_empty());
        assert!(topics_for("nope").is_empty());

        let topic = find_topic("science", "rutherford");
        assert_eq!(topic.map(|t| t.name), Some("Rutherford's Atomic Model"));
        assert_eq!(find_topic("math", "rutherford"), None);
    }

    #[test]
    fn test_find_subject_and_class() {
        assert_eq!(find_subject("cs").map(|s| s.name), Some("Computer Science"));
        assert_eq!(find_subject("history"), None);
        assert_eq!(find_class(10).map(|c| c.label), Some("10"));
        assert_eq!(find_class(4), None);
    }
}
