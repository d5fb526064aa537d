//! Editing rules for the new/edit entry form.

use crate::diary_entry::{parse_calendar_date, DiaryEntry, SkillCategory, DATE_FORMAT};
use crate::error::{DraftError, PhotoError};
use chrono::NaiveDate;

pub const MAX_PHOTOS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryDraft {
    id: Option<String>,
    linked_portfolio_id: Option<String>,
    pub date: String,
    pub site_name: String,
    pub supervisor: String,
    pub what_i_learned: String,
    pub issues_or_questions: String,
    tasks: Vec<String>,
    skills: Vec<SkillCategory>,
    mood: Option<u8>,
    photos: Vec<String>,
}

fn blank_to_none(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl EntryDraft {
    pub fn new(today: NaiveDate) -> Self {
        EntryDraft {
            date: today.format(DATE_FORMAT).to_string(),
            ..Default::default()
        }
    }

    pub fn from_entry(entry: &DiaryEntry) -> Self {
        EntryDraft {
            id: entry.id.clone(),
            linked_portfolio_id: entry.linked_portfolio_id.clone(),
            date: entry.date.clone(),
            site_name: entry.site_name.clone(),
            supervisor: entry.supervisor.clone().unwrap_or_default(),
            what_i_learned: entry.what_i_learned.clone().unwrap_or_default(),
            issues_or_questions: entry.issues_or_questions.clone().unwrap_or_default(),
            tasks: entry.tasks_completed.clone(),
            skills: entry.skills_practised.clone(),
            mood: entry.mood_rating,
            photos: entry.photos.clone(),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }

    pub fn skills(&self) -> &[SkillCategory] {
        &self.skills
    }

    pub fn mood(&self) -> Option<u8> {
        self.mood
    }

    pub fn photos(&self) -> &[String] {
        &self.photos
    }

    /// Returns `false` when the task was blank or already listed.
    pub fn add_task(&mut self, task: &str) -> bool {
        let task = task.trim();
        if task.is_empty() || self.tasks.iter().any(|t| t == task) {
            return false;
        }
        self.tasks.push(task.to_string());
        true
    }

    pub fn remove_task(&mut self, task: &str) {
        self.tasks.retain(|t| t != task);
    }

    pub fn toggle_skill(&mut self, skill: SkillCategory) {
        if let Some(pos) = self.skills.iter().position(|s| *s == skill) {
            self.skills.remove(pos);
        } else {
            self.skills.push(skill);
        }
    }

    /// Picking the current rating again clears it.
    pub fn set_mood(&mut self, rating: u8) -> Result<(), DraftError> {
        if !(1..=5).contains(&rating) {
            return Err(DraftError::MoodOutOfRange(rating));
        }
        self.mood = if self.mood == Some(rating) {
            None
        } else {
            Some(rating)
        };
        Ok(())
    }

    pub fn remaining_photo_slots(&self) -> usize {
        MAX_PHOTOS.saturating_sub(self.photos.len())
    }

    pub fn ensure_photo_slot(&self) -> Result<(), PhotoError> {
        if self.photos.len() >= MAX_PHOTOS {
            return Err(PhotoError::LimitReached(MAX_PHOTOS));
        }
        Ok(())
    }

    /// Appends an already-uploaded photo URL.
    pub fn attach_photo(&mut self, url: String) -> Result<(), PhotoError> {
        self.ensure_photo_slot()?;
        self.photos.push(url);
        Ok(())
    }

    pub fn remove_photo(&mut self, index: usize) -> Option<String> {
        (index < self.photos.len()).then(|| self.photos.remove(index))
    }

    pub fn can_save(&self) -> bool {
        !self.site_name.trim().is_empty()
    }

    pub fn into_entry(self) -> Result<DiaryEntry, DraftError> {
        if !self.can_save() {
            return Err(DraftError::MissingSiteName);
        }
        let date = parse_calendar_date(&self.date)
            .ok_or_else(|| DraftError::InvalidDate(self.date.clone()))?;

        Ok(DiaryEntry {
            id: self.id,
            date: date.format(DATE_FORMAT).to_string(),
            site_name: self.site_name.trim().to_string(),
            supervisor: blank_to_none(&self.supervisor),
            tasks_completed: self.tasks,
            skills_practised: self.skills,
            what_i_learned: blank_to_none(&self.what_i_learned),
            issues_or_questions: blank_to_none(&self.issues_or_questions),
            mood_rating: self.mood,
            photos: self.photos,
            linked_portfolio_id: self.linked_portfolio_id,
        })
    }
}
