use crate::core::crud::DataLayer;
use crate::core::query_cache::{QueryKey, QueryState};
use crate::domain::model::{
    decode_item, decode_list, Advice, AgronomistStatistics, Disease, FarmerStatistics, Medicine,
    Notification, User,
};
use crate::resources::advice::ADVICE;
use crate::resources::disease::DISEASES;
use crate::resources::medicine::MEDICINES;
use crate::resources::notification::NOTIFICATIONS;
use serde::de::DeserializeOwned;

pub const PROFILE: &str = "auth/me";
pub const FARMER_STATISTICS: &str = "statistics/farmer";
pub const AGRONOMIST_STATISTICS: &str = "statistics/agronomist";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSlot {
    Profile,
    Diseases,
    Medicines,
    FarmerStatistics,
    AgronomistStatistics,
    Notifications,
    Advice,
}

impl ContextSlot {
    /// 查詢 key 與端點路徑相同
    pub fn path(&self) -> &'static str {
        match self {
            ContextSlot::Profile => PROFILE,
            ContextSlot::Diseases => DISEASES,
            ContextSlot::Medicines => MEDICINES,
            ContextSlot::FarmerStatistics => FARMER_STATISTICS,
            ContextSlot::AgronomistStatistics => AGRONOMIST_STATISTICS,
            ContextSlot::Notifications => NOTIFICATIONS,
            ContextSlot::Advice => ADVICE,
        }
    }

    pub fn key(&self) -> QueryKey {
        QueryKey::new(self.path())
    }
}

/// 全域預先載入的資料；每個欄位各自成功或失敗
#[derive(Debug, Clone, Default)]
pub struct AppContext {
    pub profile: QueryState<User>,
    pub diseases: QueryState<Vec<Disease>>,
    pub medicines: QueryState<Vec<Medicine>>,
    pub farmer_statistics: QueryState<FarmerStatistics>,
    pub agronomist_statistics: QueryState<AgronomistStatistics>,
    pub notifications: QueryState<Vec<Notification>>,
    pub advice: QueryState<Vec<Advice>>,
}

impl AppContext {
    /// 同時抓取所有欄位
    pub async fn prefetch(layer: &DataLayer) -> Self {
        tracing::debug!("⏳ prefetching app context");

        let (profile, diseases, medicines, farmer_statistics, agronomist_statistics, notifications, advice) = tokio::join!(
            fetch(layer, ContextSlot::Profile, false),
            fetch(layer, ContextSlot::Diseases, false),
            fetch(layer, ContextSlot::Medicines, false),
            fetch(layer, ContextSlot::FarmerStatistics, false),
            fetch(layer, ContextSlot::AgronomistStatistics, false),
            fetch(layer, ContextSlot::Notifications, false),
            fetch(layer, ContextSlot::Advice, false),
        );

        let context = Self {
            profile: item(profile),
            diseases: list(diseases),
            medicines: list(medicines),
            farmer_statistics: item(farmer_statistics),
            agronomist_statistics: item(agronomist_statistics),
            notifications: list(notifications),
            advice: list(advice),
        };
        context.log_failures();
        context
    }

    fn log_failures(&self) {
        let failures = [
            (ContextSlot::Profile, self.profile.error.as_ref()),
            (ContextSlot::Diseases, self.diseases.error.as_ref()),
            (ContextSlot::Medicines, self.medicines.error.as_ref()),
            (ContextSlot::FarmerStatistics, self.farmer_statistics.error.as_ref()),
            (ContextSlot::AgronomistStatistics, self.agronomist_statistics.error.as_ref()),
            (ContextSlot::Notifications, self.notifications.error.as_ref()),
            (ContextSlot::Advice, self.advice.error.as_ref()),
        ];
        for (slot, error) in failures {
            if let Some(error) = error {
                tracing::debug!("⚠️ {} unavailable: {}", slot.path(), error);
            }
        }
    }

    pub async fn refetch_profile(&mut self, layer: &DataLayer) {
        self.profile = item(fetch(layer, ContextSlot::Profile, true).await);
    }

    pub async fn refetch_diseases(&mut self, layer: &DataLayer) {
        self.diseases = list(fetch(layer, ContextSlot::Diseases, true).await);
    }

    pub async fn refetch_medicines(&mut self, layer: &DataLayer) {
        self.medicines = list(fetch(layer, ContextSlot::Medicines, true).await);
    }

    pub async fn refetch_farmer_statistics(&mut self, layer: &DataLayer) {
        self.farmer_statistics = item(fetch(layer, ContextSlot::FarmerStatistics, true).await);
    }

    pub async fn refetch_agronomist_statistics(&mut self, layer: &DataLayer) {
        self.agronomist_statistics = item(fetch(layer, ContextSlot::AgronomistStatistics, true).await);
    }

    pub async fn refetch_notifications(&mut self, layer: &DataLayer) {
        self.notifications = list(fetch(layer, ContextSlot::Notifications, true).await);
    }

    pub async fn refetch_advice(&mut self, layer: &DataLayer) {
        self.advice = list(fetch(layer, ContextSlot::Advice, true).await);
    }

    pub fn unread_notifications(&self) -> usize {
        self.notifications
            .data
            .as_deref()
            .map(crate::resources::notification::unread_count)
            .unwrap_or(0)
    }
}

// 後端有時包一層 {success, message, data}，所以先拿原始 JSON 再解碼
async fn fetch(layer: &DataLayer, slot: ContextSlot, refresh: bool) -> QueryState<serde_json::Value> {
    if refresh {
        layer.refetch(&slot.key(), slot.path()).await
    } else {
        layer.query(&slot.key(), slot.path()).await
    }
}

fn item<T: DeserializeOwned>(state: QueryState<serde_json::Value>) -> QueryState<T> {
    map_state(state, decode_item)
}

fn list<T: DeserializeOwned>(state: QueryState<serde_json::Value>) -> QueryState<Vec<T>> {
    map_state(state, |value| decode_list(value).map(|page| page.data))
}

fn map_state<T>(
    state: QueryState<serde_json::Value>,
    decode: impl Fn(serde_json::Value) -> crate::utils::error::Result<T>,
) -> QueryState<T> {
    let QueryState {
        data,
        error,
        status,
        is_stale,
    } = state;

    match data.map(decode) {
        Some(Ok(decoded)) => QueryState {
            data: Some(decoded),
            error,
            status,
            is_stale,
        },
        Some(Err(e)) => QueryState {
            data: None,
            error: Some(e.to_string()),
            status: crate::core::query_cache::QueryStatus::Error,
            is_stale: false,
        },
        None => QueryState {
            data: None,
            error,
            status,
            is_stale,
        },
    }
}
