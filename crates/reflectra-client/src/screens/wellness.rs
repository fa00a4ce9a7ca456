use std::collections::BTreeMap;

use chrono::NaiveDate;
use reflectra_shared::types::{MoodLog, SleepQuality};
use reflectra_shared::{validation, ReflectraError, Result};
use tokio::sync::watch;
use tracing::info;

use super::scope::{scoped_call, ScreenState, Scoped};
use crate::backend::SocialBackend;
use crate::projector::{self, CalendarDay, ChartPoint, WellnessSummary};

/// Raw check-in input as typed by the user.
#[derive(Debug, Clone)]
pub struct CheckIn {
    pub mood: i64,
    pub stress: i64,
    pub sleep: SleepQuality,
    pub notes: Option<String>,
}

#[derive(Debug, Default)]
pub struct WellnessState {
    logs: Vec<MoodLog>,
    loaded: bool,
    notice: Option<String>,
}

impl ScreenState for WellnessState {
    fn notice_mut(&mut self) -> &mut Option<String> {
        &mut self.notice
    }
}

/// Mood and stress history with the quick check-in form.
pub struct WellnessScreen<B> {
    backend: B,
    scoped: Scoped<WellnessState>,
}

impl<B: SocialBackend> WellnessScreen<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            scoped: Scoped::new(WellnessState::default()),
        }
    }

    pub async fn mount(&self) {
        match self.scoped.run(self.backend.mood_logs()).await {
            None => {}
            Some(Ok(logs)) => {
                self.scoped.apply(|s| {
                    s.logs = logs;
                    s.loaded = true;
                });
            }
            Some(Err(err)) => self.scoped.report("load mood logs", &err),
        }
    }

    pub async fn check_in(&self, input: CheckIn) -> Result<MoodLog> {
        let new = match validation::check_in(
            input.mood,
            input.stress,
            input.sleep,
            input.notes.as_deref(),
        ) {
            Ok(new) => new,
            Err(e) => {
                let err = ReflectraError::from(e);
                self.scoped.report("check in", &err);
                return Err(err);
            }
        };

        let log = scoped_call(&self.scoped, "check in", self.backend.create_mood_log(&new)).await?;
        info!(mood = log.mood, stress = log.stress, "check-in recorded");
        self.scoped.apply(|s| {
            s.logs.push(log.clone());
            s.notice = None;
        });
        Ok(log)
    }

    pub fn logs(&self) -> Vec<MoodLog> {
        self.scoped.read(|s| s.logs.clone())
    }

    pub fn is_loaded(&self) -> bool {
        self.scoped.read(|s| s.loaded)
    }

    pub fn chart(&self) -> Vec<ChartPoint> {
        self.scoped.read(|s| projector::chart_series(&s.logs))
    }

    pub fn calendar(&self) -> BTreeMap<NaiveDate, CalendarDay> {
        self.scoped.read(|s| projector::calendar(&s.logs))
    }

    pub fn summary(&self) -> Option<WellnessSummary> {
        self.scoped.read(|s| projector::summary(&s.logs))
    }

    pub fn notice(&self) -> Option<String> {
        self.scoped.notice()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.scoped.subscribe()
    }

    pub fn unmount(&self) {
        self.scoped.unmount(|_| {});
    }
}
