use serde::Deserialize;
use serde_json::from_str;

use include_dir::{include_dir, Dir};
use itertools::Itertools;
use std::error::Error;

use crate::machine::ExerciseSelection;

static LESSON_DIR: Dir = include_dir!("src/lessons");

fn default_true() -> bool {
    true
}

fn default_minimum_speed() -> f64 {
    crate::settings::DEFAULT_MINIMUM_WPM
}

/// One embedded lesson manifest (a category of lessons).
#[derive(Deserialize, Clone, Debug)]
pub struct LessonFile {
    pub category: String,
    pub lessons: Vec<Lesson>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Lesson {
    /// Categories that are a flat list of exercises leave this unset.
    pub number: Option<u32>,
    pub exercises: Vec<Exercise>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Exercise {
    pub number: u32,
    pub text: String,
    #[serde(default = "default_true")]
    pub tutor_active: bool,
    #[serde(default = "default_true")]
    pub keyboard_visible: bool,
    #[serde(default = "default_minimum_speed")]
    pub minimum_speed: f64,
    #[serde(default)]
    pub errors_coefficient: Option<f64>,
}

/// Lesson text provider: looks up exercises in an embedded category
/// manifest and turns them into `ExerciseSelection` payloads, to be fed
/// to the machine as `ExerciseSelected` events.
#[derive(Clone, Debug)]
pub struct LessonCatalog {
    file: LessonFile,
}

impl LessonCatalog {
    pub fn load(category_file: &str) -> Result<Self, Box<dyn Error>> {
        let file = LESSON_DIR
            .get_file(format!("{}.json", category_file))
            .ok_or_else(|| format!("no lesson manifest for category '{}'", category_file))?;

        let contents = file
            .contents_utf8()
            .ok_or("lesson manifest is not valid UTF-8")?;

        Ok(Self {
            file: from_str(contents)?,
        })
    }

    pub fn category(&self) -> &str {
        &self.file.category
    }

    /// Exercise lookup; `None` when the lesson or exercise is absent.
    /// A `lesson_number` of `None` addresses the category's flat lesson.
    pub fn find(&self, lesson_number: Option<u32>, exercise_number: u32) -> Option<ExerciseSelection> {
        let lesson = self
            .file
            .lessons
            .iter()
            .find(|l| l.number == lesson_number)?;
        let exercise = lesson.exercises.iter().find(|e| e.number == exercise_number)?;

        Some(ExerciseSelection {
            lesson_text: exercise.text.clone(),
            category: self.file.category.clone(),
            lesson_number: lesson.number,
            exercise_number: exercise.number,
            tutor_active: exercise.tutor_active,
            keyboard_visible: exercise.keyboard_visible,
            minimum_speed: exercise.minimum_speed,
            errors_coefficient: exercise.errors_coefficient,
        })
    }

    /// All `(lesson, exercise)` pairs in catalog order.
    pub fn entries(&self) -> Vec<(Option<u32>, u32)> {
        self.file
            .lessons
            .iter()
            .sorted_by_key(|l| l.number)
            .flat_map(|l| {
                l.exercises
                    .iter()
                    .sorted_by_key(|e| e.number)
                    .map(move |e| (l.number, e.number))
            })
            .collect()
    }

    /// The entry following `(lesson_number, exercise_number)`, or `None`
    /// at the end of the catalog.
    pub fn next_after(
        &self,
        lesson_number: Option<u32>,
        exercise_number: u32,
    ) -> Option<(Option<u32>, u32)> {
        let entries = self.entries();
        let idx = entries
            .iter()
            .position(|&(l, e)| l == lesson_number && e == exercise_number)?;
        entries.get(idx + 1).copied()
    }
}
