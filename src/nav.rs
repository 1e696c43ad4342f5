//! Screen navigation: grade → subject → topic → lab, with a linear back-stack

use crate::catalog::{ClassInfo, Subject, Topic};

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    SubjectDashboard,
    TopicDashboard,
    Simulation,
}

/// Current screen plus the selections that led to it
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    pub view: View,
    pub class: Option<ClassInfo>,
    pub subject: Option<Subject>,
    pub topic: Option<Topic>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_class(&mut self, class: ClassInfo) {
        self.class = Some(class);
        self.view = View::SubjectDashboard;
    }

    pub fn select_subject(&mut self, subject: Subject) {
        self.subject = Some(subject);
        self.view = View::TopicDashboard;
    }

    pub fn select_topic(&mut self, topic: Topic) {
        self.topic = Some(topic);
        self.view = View::Simulation;
    }

    /// Step back one screen; selections are kept so going forward again is cheap
    pub fn go_back(&mut self) {
        self.view = match self.view {
            View::Simulation => View::TopicDashboard,
            View::TopicDashboard => View::SubjectDashboard,
            View::SubjectDashboard | View::Dashboard => View::Dashboard,
        };
    }

    pub fn can_go_back(&self) -> bool {
        self.view != View::Dashboard
    }

    /// Text shown on the right of the header
    pub fn header_subtitle(&self) -> String {
        let class_label = self.class.map(|c| c.label).unwrap_or_default();
        match self.view {
            View::Dashboard => "Select your grade".to_string(),
            View::SubjectDashboard => format!("Class {}", class_label),
            View::TopicDashboard => format!(
                "{} • Class {}",
                self.subject.map(|s| s.name).unwrap_or_default(),
                class_label
            ),
            View::Simulation => self.topic.map(|t| t.name).unwrap_or_default().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CLASSES, SUBJECTS, topics_for};

    #[test]
    fn test_forward_and_back() {
        let mut nav = Navigator::new();
        assert_eq!(nav.view, View::Dashboard);
        assert!(!nav.can_go_back());
        assert_eq!(nav.header_subtitle(), "Select your grade");

        nav.select_class(CLASSES[5]);
        assert_eq!(nav.view, View::SubjectDashboard);
        assert_eq!(nav.header_subtitle(), "Class 10");

        nav.select_subject(SUBJECTS[1]);
        assert_eq!(nav.view, View::TopicDashboard);
        assert_eq!(nav.header_subtitle(), "Science • Class 10");

        nav.select_topic(topics_for("science")[0]);
        assert_eq!(nav.view, View::Simulation);
        assert_eq!(nav.header_subtitle(), "Rutherford's Atomic Model");

        nav.go_back();
        assert_eq!(nav.view, View::TopicDashboard);
        nav.go_back();
        assert_eq!(nav.view, View::SubjectDashboard);
        nav.go_back();
        assert_eq!(nav.view, View::Dashboard);
        nav.go_back();
        assert_eq!(nav.view, View::Dashboard);
    }
}
