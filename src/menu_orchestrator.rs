use std::{sync::Arc, time::Instant};

use chrono::{Local, NaiveDate};
use tokio::task::JoinHandle;

use crate::data_types::{format_menu_date, DailyMenu, MealOptionSet, SlotKind};
use crate::default_meals::default_option_set;
use crate::slot_generator::SlotGenerator;

/// Builds complete daily menus; never fails.
pub struct MenuOrchestrator {
    slot_generator: Arc<SlotGenerator>,
}

impl MenuOrchestrator {
    pub fn new(slot_generator: SlotGenerator) -> Self {
        MenuOrchestrator {
            slot_generator: Arc::new(slot_generator),
        }
    }

    pub async fn generate_daily_menu(&self) -> DailyMenu {
        self.generate_menu_for(Local::now().date_naive()).await
    }

    /// Generates all three slots concurrently, each in its own task so one slot's
    /// retries never hold up another.
    pub async fn generate_menu_for(&self, date: NaiveDate) -> DailyMenu {
        let now = Instant::now();

        let (breakfast, lunch, dinner) = tokio::join!(
            self.spawn_slot(SlotKind::Breakfast),
            self.spawn_slot(SlotKind::Lunch),
            self.spawn_slot(SlotKind::Dinner),
        );

        let menu = DailyMenu {
            date: format_menu_date(date),
            breakfast: checked_slot(SlotKind::Breakfast, breakfast),
            lunch: checked_slot(SlotKind::Lunch, lunch),
            dinner: checked_slot(SlotKind::Dinner, dinner),
        };

        log::info!("Generated menu for {}: {:.2?}", menu.date, now.elapsed());
        if log::log_enabled!(log::Level::Debug) {
            if let Ok(json) = serde_json::to_string_pretty(&menu) {
                log::debug!("Generated menu:\n{}", json);
            }
        }

        menu
    }

    fn spawn_slot(&self, slot: SlotKind) -> JoinHandle<MealOptionSet> {
        let slot_generator = self.slot_generator.clone();
        tokio::spawn(async move { slot_generator.generate(slot).await })
    }
}

/// Substitutes the full default set for a slot whose task died or that came back with
/// the wrong number of options.
fn checked_slot(
    slot: SlotKind,
    joined: Result<MealOptionSet, tokio::task::JoinError>,
) -> MealOptionSet {
    match joined {
        Ok(options) if options.fits(slot) => options,
        Ok(options) => {
            log::error!(
                "{}: got {} options instead of {}, using default meals",
                slot,
                options.arity(),
                slot.arity()
            );
            default_option_set(slot)
        }
        Err(e) => {
            log::error!(
                "{}: generation task failed: {}, using default meals",
                slot,
                e
            );
            default_option_set(slot)
        }
    }
}
