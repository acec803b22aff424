//! Inbound menu operations: today's menu with lazy regeneration, unconditional
//! regeneration, and operator-supplied menus.

use std::{sync::Arc, time::Instant};

use chrono::{Local, NaiveDate};
use serde_json::Value;

use crate::constants::ALTERNATIVE_SUFFIX;
use crate::data_types::{
    format_menu_date, DailyMenu, ManualMenuRequest, MealOptionSet, OptionIndex, SlotKind,
};
use crate::db_operations::MenuStore;
use crate::default_meals::default_meal;
use crate::errors::MenuError;
use crate::meal_sanitizer::normalize_meal;
use crate::menu_orchestrator::MenuOrchestrator;

/// A menu is stale when there is none, or when its day has ended. Unreadable dates
/// count as stale.
pub fn is_stale(menu: Option<&DailyMenu>, today: NaiveDate) -> bool {
    match menu.map(DailyMenu::menu_date) {
        None => true,
        Some(None) => true,
        Some(Some(date)) => date < today,
    }
}

pub struct MenuService {
    orchestrator: MenuOrchestrator,
    store: Arc<dyn MenuStore>,
}

impl MenuService {
    pub fn new(orchestrator: MenuOrchestrator, store: Arc<dyn MenuStore>) -> Self {
        MenuService {
            orchestrator,
            store,
        }
    }

    /// The stored menu, regenerated first if it is missing or from a past day.
    pub async fn get_today_menu(&self) -> Result<DailyMenu, MenuError> {
        let stored = self.store.find_latest()?;
        let today = Local::now().date_naive();

        match stored {
            Some(menu) if !is_stale(Some(&menu), today) => Ok(menu),
            stale => {
                match stale {
                    Some(menu) => {
                        log::info!("Stored menu from {} is stale, regenerating", menu.date)
                    }
                    None => log::info!("No stored menu, generating one"),
                }
                self.regenerate_and_persist().await
            }
        }
    }

    pub async fn regenerate_menu(&self) -> Result<DailyMenu, MenuError> {
        log::info!("Manually regenerating menu");
        self.regenerate_and_persist().await
    }

    /// Generates a fresh menu and swaps it in for whatever is stored.
    pub async fn regenerate_and_persist(&self) -> Result<DailyMenu, MenuError> {
        let now = Instant::now();
        let menu = self.orchestrator.generate_daily_menu().await;
        self.store.replace_all(&menu)?;
        log::info!("Stored menu for {}: {:.2?}", menu.date, now.elapsed());
        Ok(menu)
    }

    /// Stores an operator-supplied menu for today. Each slot is normalized against that
    /// slot's default meal; lunch and dinner get a suffixed copy as their alternative.
    pub fn replace_with_manual(&self, request: &ManualMenuRequest) -> Result<DailyMenu, MenuError> {
        let menu = manual_menu(request, Local::now().date_naive())?;
        self.store.replace_all(&menu)?;
        log::info!("Stored manual menu for {}", menu.date);
        Ok(menu)
    }
}

/// Lunch and dinner get the operator's meal twice, the second named with the
/// alternative suffix. The pair is not run through the diversity check: an operator
/// override is stored as given even though the two options are near duplicates.
fn manual_slot(slot: SlotKind, value: Option<&Value>) -> Result<MealOptionSet, MenuError> {
    let fallback = default_meal(slot, OptionIndex::Primary);
    let meal = match value {
        None | Some(Value::Null) => fallback,
        Some(Value::Object(obj)) => normalize_meal(obj, &fallback),
        Some(other) => {
            return Err(MenuError::InvalidManualMenu(format!(
                "{} must be an object, got {}",
                slot, other
            )))
        }
    };

    Ok(match slot {
        SlotKind::Breakfast => MealOptionSet::single(meal),
        SlotKind::Lunch | SlotKind::Dinner => {
            let mut alternate = meal.clone();
            alternate.name.push_str(ALTERNATIVE_SUFFIX);
            MealOptionSet::pair(meal, alternate)
        }
    })
}

fn manual_menu(request: &ManualMenuRequest, date: NaiveDate) -> Result<DailyMenu, MenuError> {
    Ok(DailyMenu {
        date: format_menu_date(date),
        breakfast: manual_slot(SlotKind::Breakfast, request.slot(SlotKind::Breakfast))?,
        lunch: manual_slot(SlotKind::Lunch, request.slot(SlotKind::Lunch))?,
        dinner: manual_slot(SlotKind::Dinner, request.slot(SlotKind::Dinner))?,
    })
}
