use anyhow::Result;
use chrono::{DateTime, Days, Local, TimeZone};
use std::{sync::Arc, time::Duration};
use tokio_cron_scheduler::{Job, JobScheduler};
use uuid::Uuid;

use crate::{constants::REGENERATION_PERIOD, menu_service::MenuService};

/// Time left until the next local midnight. Falls back to a full period if the
/// calendar cannot resolve midnight (e.g. a DST gap).
pub fn duration_until_next_midnight(now: DateTime<Local>) -> Duration {
    now.date_naive()
        .checked_add_days(Days::new(1))
        .and_then(|tomorrow| tomorrow.and_hms_opt(0, 0, 0))
        .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
        .and_then(|midnight| (midnight - now).to_std().ok())
        .unwrap_or(REGENERATION_PERIOD)
}

/// Scheduled trigger: a failed regeneration is logged and left for the next fire.
pub async fn scheduled_regeneration(service: &MenuService) {
    log::info!(target: "daily_menu_rs::TaskSched", "Regenerating menu for today...");
    match service.regenerate_and_persist().await {
        Ok(menu) => {
            log::info!(target: "daily_menu_rs::TaskSched", "Menu for {} regenerated!", menu.date)
        }
        Err(e) => log::error!(
            target: "daily_menu_rs::TaskSched",
            "Scheduled regeneration failed, waiting for next run: {}",
            e
        ),
    }
}

/// Owns the daily regeneration timer: fires once at the next local midnight, then
/// every 24 hours until shut down.
pub struct RegenerationScheduler {
    sched: JobScheduler,
    midnight_job: Uuid,
}

impl RegenerationScheduler {
    pub async fn start(service: Arc<MenuService>) -> Result<Self> {
        let first_fire = duration_until_next_midnight(Local::now());
        Self::start_with_timing(service, first_fire, REGENERATION_PERIOD).await
    }

    pub async fn start_with_timing(
        service: Arc<MenuService>,
        first_fire: Duration,
        period: Duration,
    ) -> Result<Self> {
        let sched = JobScheduler::new().await?;

        let midnight_job = Job::new_one_shot_async(first_fire, move |_uuid, l| {
            let service = service.clone();

            Box::pin(async move {
                // re-arm before running so the period counts from this fire
                let repeat_service = service.clone();
                match Job::new_repeated_async(period, move |_uuid, _l| {
                    let service = repeat_service.clone();
                    Box::pin(async move {
                        scheduled_regeneration(&service).await;
                    })
                }) {
                    Ok(daily_job) => {
                        if let Err(e) = l.add(daily_job).await {
                            log::error!(
                                target: "daily_menu_rs::TaskSched",
                                "Could not arm daily job: {}",
                                e
                            );
                        }
                    }
                    Err(e) => log::error!(
                        target: "daily_menu_rs::TaskSched",
                        "Could not build daily job: {}",
                        e
                    ),
                }

                scheduled_regeneration(&service).await;
            })
        })?;

        let midnight_job = sched.add(midnight_job).await?;

        // start scheduler (non blocking)
        sched.start().await?;
        log::info!(
            target: "daily_menu_rs::TaskSched",
            "Next regeneration in {:.0?}, then every {:.0?}",
            first_fire,
            period
        );

        Ok(RegenerationScheduler {
            sched,
            midnight_job,
        })
    }

    pub async fn shutdown(mut self) -> Result<()> {
        // harmless if the one-shot already fired
        let _ = self.sched.remove(&self.midnight_job).await;
        self.sched.shutdown().await?;
        log::info!(target: "daily_menu_rs::TaskSched", "Scheduler stopped.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    use chrono::NaiveDate;

    use super::*;
    use crate::data_backend::mock_model::{ScriptedModel, Step};
    use crate::data_types::{format_menu_date, DailyMenu, RetryPolicy, SamplingConfig};
    use crate::db_operations::{MemoryMenuStore, MenuStore};
    use crate::errors::StoreError;
    use crate::menu_orchestrator::MenuOrchestrator;
    use crate::slot_generator::SlotGenerator;

    struct BrokenStore;

    impl MenuStore for BrokenStore {
        fn find_latest(&self) -> Result<Option<DailyMenu>, StoreError> {
            Err(StoreError::Poisoned)
        }

        fn replace_all(&self, _menu: &DailyMenu) -> Result<(), StoreError> {
            Err(StoreError::Poisoned)
        }
    }

    #[derive(Default)]
    struct CountingStore {
        inner: MemoryMenuStore,
        writes: AtomicUsize,
    }

    impl MenuStore for CountingStore {
        fn find_latest(&self) -> Result<Option<DailyMenu>, StoreError> {
            self.inner.find_latest()
        }

        fn replace_all(&self, menu: &DailyMenu) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.replace_all(menu)
        }
    }

    fn service(store: Arc<dyn MenuStore>) -> Arc<MenuService> {
        let orchestrator = MenuOrchestrator::new(SlotGenerator::new(
            Arc::new(ScriptedModel::always(Step::Timeout)),
            RetryPolicy {
                max_retries: 0,
                base_delay: Duration::from_millis(1),
            },
            SamplingConfig::default(),
        ));
        Arc::new(MenuService::new(orchestrator, store))
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        let naive = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap();
        Local.from_local_datetime(&naive).earliest().unwrap()
    }

    #[test]
    fn midnight_is_never_in_the_past() {
        let now = Local::now();
        let wait = duration_until_next_midnight(now);
        assert!(wait > Duration::ZERO);
        assert!(wait <= Duration::from_secs(25 * 60 * 60));
    }

    #[test]
    fn late_evening_waits_until_midnight() {
        // mid-January avoids DST transitions in every common zone
        let wait = duration_until_next_midnight(local(2024, 1, 15, 23, 30));
        assert_eq!(wait, Duration::from_secs(30 * 60));

        let wait = duration_until_next_midnight(local(2024, 1, 15, 0, 0));
        assert_eq!(wait, Duration::from_secs(24 * 60 * 60));
    }

    #[tokio::test]
    async fn scheduled_failure_is_swallowed() {
        // must return normally instead of propagating the store error
        scheduled_regeneration(&service(Arc::new(BrokenStore))).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn fires_and_persists_a_menu() {
        let store = Arc::new(MemoryMenuStore::default());
        let scheduler = RegenerationScheduler::start_with_timing(
            service(store.clone()),
            Duration::from_millis(50),
            REGENERATION_PERIOD,
        )
        .await
        .unwrap();

        let started = Instant::now();
        while store.find_latest().unwrap().is_none() {
            assert!(
                started.elapsed() < Duration::from_secs(10),
                "scheduler never fired"
            );
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        let menu = store.find_latest().unwrap().unwrap();
        assert_eq!(menu.date, format_menu_date(Local::now().date_naive()));
        scheduler.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn keeps_regenerating_every_period_after_the_first_fire() {
        let store = Arc::new(CountingStore::default());
        let scheduler = RegenerationScheduler::start_with_timing(
            service(store.clone()),
            Duration::from_millis(100),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

        tokio::time::sleep(Duration::from_millis(4500)).await;
        scheduler.shutdown().await.unwrap();

        // one midnight fire plus at least two repeats
        let writes = store.writes.load(Ordering::SeqCst);
        assert!(writes >= 3, "only {} regenerations", writes);
        assert!(store.find_latest().unwrap().is_some());
    }
}
