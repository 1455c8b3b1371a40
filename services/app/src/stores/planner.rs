//! services/app/src/stores/planner.rs
//!
//! The planner store: in-memory goals and reminders keyed by calendar day,
//! plus the AI-backed revision recommendation. Date matching is strictly
//! day-granular in UTC; the time-of-day component never affects filtering.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use polaris_core::domain::{StudyGoal, StudyReminder};
use polaris_core::ports::{AiService, Notifier};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::AppError;

struct PlannerState {
    goals: Vec<StudyGoal>,
    reminders: Vec<StudyReminder>,
    /// One outstanding recommendation call at a time, like any pipeline.
    busy: bool,
    recommendation: Option<String>,
}

pub struct PlannerStore {
    ai: Arc<dyn AiService>,
    notifier: Arc<dyn Notifier>,
    inner: Mutex<PlannerState>,
}

impl PlannerStore {
    pub fn new(ai: Arc<dyn AiService>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            ai,
            notifier,
            inner: Mutex::new(PlannerState {
                goals: Vec::new(),
                reminders: Vec::new(),
                busy: false,
                recommendation: None,
            }),
        }
    }

    /// Adds a goal for the selected day. Rejects an empty title or a missing
    /// date without mutating the collection.
    pub async fn add_goal(
        &self,
        title: &str,
        description: &str,
        date: Option<DateTime<Utc>>,
    ) -> Result<Uuid, AppError> {
        let title = title.trim();
        let (title, date) = match (title.is_empty(), date) {
            (false, Some(date)) => (title, date),
            _ => {
                self.notifier
                    .error("Please enter a goal title and select a date.");
                return Err(AppError::validation("goal title and date are required"));
            }
        };

        let goal = StudyGoal {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.trim().to_string(),
            date,
            completed: false,
        };
        let id = goal.id;
        self.inner.lock().await.goals.push(goal);
        self.notifier.success("Study goal added!");
        Ok(id)
    }

    /// Flips the completion flag of the matching goal. An unknown id is a
    /// silent no-op; the id always originates from a rendered entry.
    pub async fn toggle_goal(&self, id: Uuid) {
        let mut state = self.inner.lock().await;
        if let Some(goal) = state.goals.iter_mut().find(|g| g.id == id) {
            goal.completed = !goal.completed;
            drop(state);
            self.notifier.success("Goal status updated!");
        }
    }

    /// Adds a reminder for the selected day. Rejects an empty message, an
    /// empty time or a missing date without mutating the collection.
    pub async fn add_reminder(
        &self,
        message: &str,
        time: &str,
        date: Option<DateTime<Utc>>,
    ) -> Result<Uuid, AppError> {
        let message = message.trim();
        let time = time.trim();
        let (message, time, date) = match (message.is_empty(), time.is_empty(), date) {
            (false, false, Some(date)) => (message, time, date),
            _ => {
                self.notifier
                    .error("Please enter a reminder message, time, and select a date.");
                return Err(AppError::validation(
                    "reminder message, time and date are required",
                ));
            }
        };

        let reminder = StudyReminder {
            id: Uuid::new_v4(),
            message: message.to_string(),
            time: time.to_string(),
            date,
        };
        let id = reminder.id;
        self.inner.lock().await.reminders.push(reminder);
        self.notifier.success("Study reminder added!");
        Ok(id)
    }

    /// Goals falling on the same UTC calendar day as `date`.
    pub async fn goals_for(&self, date: DateTime<Utc>) -> Vec<StudyGoal> {
        let day = date.date_naive();
        self.inner
            .lock()
            .await
            .goals
            .iter()
            .filter(|g| g.date.date_naive() == day)
            .cloned()
            .collect()
    }

    /// Reminders falling on the same UTC calendar day as `date`.
    pub async fn reminders_for(&self, date: DateTime<Utc>) -> Vec<StudyReminder> {
        let day = date.date_naive();
        self.inner
            .lock()
            .await
            .reminders
            .iter()
            .filter(|r| r.date.date_naive() == day)
            .cloned()
            .collect()
    }

    pub async fn recommendation(&self) -> Option<String> {
        self.inner.lock().await.recommendation.clone()
    }

    pub async fn is_busy(&self) -> bool {
        self.inner.lock().await.busy
    }

    /// Asks the AI for a revision schedule built from the current goals.
    /// At most one call is outstanding; an overlapping call is a no-op.
    pub async fn recommend_schedule(&self) -> Result<(), AppError> {
        let digest = {
            let mut state = self.inner.lock().await;
            if state.busy {
                return Ok(());
            }
            state.busy = true;
            state
                .goals
                .iter()
                .map(|g| {
                    format!(
                        "{} on {}{}",
                        g.title,
                        g.date.date_naive(),
                        if g.completed { " (done)" } else { "" }
                    )
                })
                .collect::<Vec<_>>()
                .join("; ")
        };

        self.notifier.success("Generating revision schedule...");
        let result = self.ai.recommend_revision(&digest).await;

        let mut state = self.inner.lock().await;
        state.busy = false;
        match result {
            Ok(schedule) => {
                state.recommendation = Some(schedule);
                drop(state);
                self.notifier.success("AI revision schedule recommended!");
                Ok(())
            }
            Err(e) => {
                drop(state);
                self.notifier
                    .error("Failed to generate AI schedule. Please try again.");
                Err(AppError::Gateway(e))
            }
        }
    }
}
