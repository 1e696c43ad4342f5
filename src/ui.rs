//! View models for the picker screens and the lab overlay
//!
//! Everything here is a pure function of catalog/sim state so it can be
//! tested natively. The wasm entry point turns these into DOM nodes and
//! routes clicks through the `data-*` attributes.

use glam::Vec3;

use crate::catalog::{CLASSES, ClassInfo, SUBJECTS, Subject, topics_for};
use crate::renderer::camera::OrbitCamera;
use crate::renderer::palette::status_css;
use crate::sim::{LabState, ParticleStatus, ScatterStats};

/// Click actions carried on `data-action`
pub const ACTION_CLASS: &str = "select-class";
pub const ACTION_SUBJECT: &str = "select-subject";
pub const ACTION_TOPIC: &str = "select-topic";

pub const EMPTY_TOPICS_MESSAGE: &str = "No modules available for this subject yet.";

/// Fixed world-space captions in the lab
pub const SCENE_LABELS: [(&str, Vec3, &str); 3] = [
    ("ALPHA EMITTER", Vec3::new(-21.0, 3.5, 0.0), "scene-label emitter"),
    ("ULTRA-THIN GOLD LEAF", Vec3::new(0.0, 9.8, 0.0), "scene-label foil"),
    ("NUCLEUS (POSITIVE)", Vec3::new(0.0, 1.0, 0.8), "scene-label nucleus"),
];

/// One text-bearing child of a picker card
#[derive(Debug, Clone, PartialEq)]
pub struct CardPart {
    pub tag: &'static str,
    pub class: String,
    pub text: String,
}

impl CardPart {
    fn new(tag: &'static str, class: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag,
            class: class.into(),
            text: text.into(),
        }
    }
}

/// A clickable picker entry rendered as a `<button>`
#[derive(Debug, Clone, PartialEq)]
pub struct PickerCard {
    pub class: String,
    /// `data-*` attributes, `data-action` first
    pub data: Vec<(&'static str, String)>,
    pub parts: Vec<CardPart>,
}

impl PickerCard {
    pub fn action(&self) -> Option<&str> {
        self.data
            .iter()
            .find(|(name, _)| *name == "data-action")
            .map(|(_, value)| value.as_str())
    }
}

/// Everything one picker screen shows
#[derive(Debug, Clone, PartialEq)]
pub struct PickerScreen {
    pub title: String,
    pub title_class: &'static str,
    pub subtitle: Option<String>,
    /// Thin accent bar under the title
    pub title_bar: bool,
    pub container_class: &'static str,
    pub cards: Vec<PickerCard>,
    /// Shown instead of the cards when there are none
    pub empty_message: Option<&'static str>,
}

pub fn dashboard_screen() -> PickerScreen {
    let cards = CLASSES
        .iter()
        .map(|class| PickerCard {
            class: "card grade-card".to_string(),
            data: vec![
                ("data-action", ACTION_CLASS.to_string()),
                ("data-class", class.id.to_string()),
            ],
            parts: vec![
                CardPart::new("span", "card-caption", "Class"),
                CardPart::new("span", "card-number", class.label),
            ],
        })
        .collect();

    PickerScreen {
        title: "Welcome to the Future of Learning".to_string(),
        title_class: "screen-title",
        subtitle: Some("Pick your grade to explore immersive educational content.".to_string()),
        title_bar: false,
        container_class: "grid grade-grid",
        cards,
        empty_message: None,
    }
}

pub fn subject_screen(class: &ClassInfo) -> PickerScreen {
    let cards = SUBJECTS
        .iter()
        .map(|subject| PickerCard {
            class: format!("card subject-card accent-{}", subject.color),
            data: vec![
                ("data-action", ACTION_SUBJECT.to_string()),
                ("data-subject", subject.id.to_string()),
            ],
            parts: vec![
                CardPart::new(
                    "span",
                    format!("card-icon icon-{}", subject.icon.to_lowercase()),
                    "",
                ),
                CardPart::new("h3", "", subject.name),
                CardPart::new("p", "", "Advanced Modules & Concepts"),
                CardPart::new("span", "card-cta", "Explore →"),
            ],
        })
        .collect();

    PickerScreen {
        title: "Curriculum Explorer".to_string(),
        title_class: "screen-title",
        subtitle: Some(format!("Class {} • All Core Disciplines", class.label)),
        title_bar: false,
        container_class: "grid subject-grid",
        cards,
        empty_message: None,
    }
}

pub fn topic_screen(subject: &Subject) -> PickerScreen {
    let topics = topics_for(subject.id);
    let cards: Vec<PickerCard> = topics
        .iter()
        .map(|topic| PickerCard {
            class: "topic-row".to_string(),
            data: vec![
                ("data-action", ACTION_TOPIC.to_string()),
                ("data-subject", subject.id.to_string()),
                ("data-topic", topic.id.to_string()),
            ],
            parts: vec![
                CardPart::new("h3", "", topic.name),
                CardPart::new("p", "", topic.description),
                CardPart::new("span", "topic-cta", "Launch Simulation"),
            ],
        })
        .collect();

    PickerScreen {
        title: format!("{} Modules", subject.name),
        title_class: "screen-title upper",
        subtitle: None,
        title_bar: true,
        container_class: "topic-list",
        empty_message: cards.is_empty().then_some(EMPTY_TOPICS_MESSAGE),
        cards,
    }
}

/// Values for the analysis panel: (element id, text, bar width %)
pub fn analysis_rows(stats: &ScatterStats) -> [(&'static str, String, f64); 3] {
    let formatted = stats.formatted();
    [
        ("stat-passed", formatted.passed, stats.pass_percentage()),
        ("stat-deflected", formatted.deflected, stats.deflect_percentage()),
        ("stat-rebounded", formatted.rebounded, stats.rebound_percentage()),
    ]
}

pub fn beam_speed_text(speed: f32) -> String {
    format!("v {:.1}", speed)
}

pub fn pause_button_text(paused: bool) -> &'static str {
    if paused { "Resume" } else { "Pause" }
}

/// A caption pinned to a projected world point
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingLabel {
    pub text: &'static str,
    pub class: String,
    pub x: f32,
    pub y: f32,
}

impl FloatingLabel {
    /// Inline position style for the label's `<div>`
    pub fn style(&self) -> String {
        format!("left:{:.1}px;top:{:.1}px", self.x, self.y)
    }
}

/// Project the fixed captions plus any live particle labels.
/// Particle labels only show while the data log is on.
pub fn floating_labels(
    state: &LabState,
    camera: &OrbitCamera,
    viewport: (f32, f32),
    show_data_log: bool,
) -> Vec<FloatingLabel> {
    let mut labels: Vec<FloatingLabel> = SCENE_LABELS
        .iter()
        .filter_map(|(text, pos, class)| {
            camera.project(*pos, viewport).map(|p| FloatingLabel {
                text: *text,
                class: class.to_string(),
                x: p.x,
                y: p.y,
            })
        })
        .collect();

    if show_data_log {
        for particle in state.particles.iter().filter(|p| p.label_visible()) {
            let Some(p) = camera.project(particle.pos, viewport) else {
                continue;
            };
            let kind = match particle.status {
                ParticleStatus::Rebounded => "rebounded",
                _ => "deflected",
            };
            labels.push(FloatingLabel {
                text: particle.status.label(),
                class: format!("particle-label {}", kind),
                x: p.x,
                y: p.y,
            });
        }
    }
    labels
}

/// Legend swatch style for a status
pub fn legend_style(status: ParticleStatus) -> String {
    format!("background:{}", status_css(status))
}
