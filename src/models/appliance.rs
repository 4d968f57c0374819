/// The six appliances the dashboard controls, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplianceId {
    Tv,
    Ac,
    Fridge,
    Oven,
    Fan,
    Light,
}

pub const APPLIANCE_COUNT: usize = 6;

impl ApplianceId {
    pub const ALL: [ApplianceId; APPLIANCE_COUNT] = [
        ApplianceId::Tv,
        ApplianceId::Ac,
        ApplianceId::Fridge,
        ApplianceId::Oven,
        ApplianceId::Fan,
        ApplianceId::Light,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ApplianceId::Tv => "TV",
            ApplianceId::Ac => "AC",
            ApplianceId::Fridge => "Fridge",
            ApplianceId::Oven => "Oven",
            ApplianceId::Fan => "Fan",
            ApplianceId::Light => "Light",
        }
    }

    /// Rated draw in kWh while the appliance is on.
    pub fn draw_kwh(&self) -> f64 {
        match self {
            ApplianceId::Tv => 0.3,
            ApplianceId::Ac => 1.2,
            ApplianceId::Fridge => 0.6,
            ApplianceId::Oven => 1.0,
            ApplianceId::Fan => 0.1,
            ApplianceId::Light => 0.2,
        }
    }

    /// Exact, case-sensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<ApplianceId> {
        ApplianceId::ALL.iter().copied().find(|id| id.name() == name)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// On/off state for every appliance. Mutations stay in memory; nothing here
/// touches durable storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliancePowerState {
    on: [bool; APPLIANCE_COUNT],
}

impl AppliancePowerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on(&self, id: ApplianceId) -> bool {
        self.on[id.index()]
    }

    pub fn set(&mut self, id: ApplianceId, on: bool) {
        self.on[id.index()] = on;
    }

    pub fn toggle(&mut self, id: ApplianceId) {
        self.on[id.index()] = !self.on[id.index()];
    }

    /// Sum of rated draws over the appliances currently on. Recomputed on
    /// every call; the total is never tracked incrementally.
    pub fn total_consumption(&self) -> f64 {
        ApplianceId::ALL
            .iter()
            .filter(|id| self.is_on(**id))
            .map(|id| id.draw_kwh())
            .sum()
    }

    /// 0/1 flags in display order, as persisted and as sent to the backend.
    pub fn flags(&self) -> [u8; APPLIANCE_COUNT] {
        let mut flags = [0u8; APPLIANCE_COUNT];
        for (i, id) in ApplianceId::ALL.iter().enumerate() {
            flags[i] = self.is_on(*id) as u8;
        }
        flags
    }
}
