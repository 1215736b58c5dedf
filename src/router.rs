//! Screen navigation.
//!
//! One [`Router`] owns the navigation stack. Screens are a closed set and
//! carry the parameters they need, so an edit screen cannot be entered
//! without saying what it edits.

use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all_fields = "camelCase")]
pub enum Screen {
    Home,
    Notes,
    NoteEdit {
        note_id: Option<String>,
    },
    Calendar,
    Farms,
    FarmEdit {
        farm_id: Option<String>,
    },
    FarmProducts {
        farm_id: String,
        farm_name: String,
    },
    FarmProductEdit {
        farm_id: String,
        product_id: Option<String>,
    },
    /// Products of every farm.
    AllFarmProducts,
    Livestock,
    LivestockEdit {
        animal_id: Option<String>,
    },
    LivestockCare {
        animal_id: String,
        animal_tag: String,
    },
    LivestockCareEdit {
        animal_id: String,
        care_id: Option<String>,
    },
    /// Care records of every animal.
    AllLivestockCare,
}

/// Bottom navigation bar entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tab {
    Home,
    Notes,
    Calendar,
    Farms,
    Livestock,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Home, Tab::Notes, Tab::Calendar, Tab::Farms, Tab::Livestock];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Home => "Inicio",
            Tab::Notes => "Notas",
            Tab::Calendar => "Calendario",
            Tab::Farms => "Fincas",
            Tab::Livestock => "Ganado",
        }
    }

    pub fn root(self) -> Screen {
        match self {
            Tab::Home => Screen::Home,
            Tab::Notes => Screen::Notes,
            Tab::Calendar => Screen::Calendar,
            Tab::Farms => Screen::Farms,
            Tab::Livestock => Screen::Livestock,
        }
    }
}

impl Screen {
    /// Tab a screen lives under.
    pub fn tab(&self) -> Tab {
        match self {
            Screen::Home => Tab::Home,
            Screen::Notes | Screen::NoteEdit { .. } => Tab::Notes,
            Screen::Calendar => Tab::Calendar,
            Screen::Farms
            | Screen::FarmEdit { .. }
            | Screen::FarmProducts { .. }
            | Screen::FarmProductEdit { .. }
            | Screen::AllFarmProducts => Tab::Farms,
            Screen::Livestock
            | Screen::LivestockEdit { .. }
            | Screen::LivestockCare { .. }
            | Screen::LivestockCareEdit { .. }
            | Screen::AllLivestockCare => Tab::Livestock,
        }
    }
}

/// Shortcut on the home screen. Pass `screen` to [`Router::navigate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeCard {
    pub title: &'static str,
    pub description: &'static str,
    pub screen: Screen,
}

pub const HOME_CARDS: [HomeCard; 6] = [
    HomeCard {
        title: "Tomar Notas",
        description: "Apunta todo lo importante y adjunta fotos.",
        screen: Screen::Notes,
    },
    HomeCard {
        title: "Calendario Agrícola",
        description: "Planifica tu año con festivos nacionales.",
        screen: Screen::Calendar,
    },
    HomeCard {
        title: "Gestionar Fincas",
        description: "Controla tus olivares, pinares y más.",
        screen: Screen::Farms,
    },
    HomeCard {
        title: "Productos Fitosanitarios",
        description: "Registro de tratamientos para tus cultivos.",
        screen: Screen::AllFarmProducts,
    },
    HomeCard {
        title: "Gestionar Ganado",
        description: "Administra tus rebaños de cabras y ovejas.",
        screen: Screen::Livestock,
    },
    HomeCard {
        title: "Cuidado Animal",
        description: "Lleva un control de vacunas y cuidados.",
        screen: Screen::AllLivestockCare,
    },
];

#[derive(Debug, Clone)]
pub struct Router {
    stack: Vec<Screen>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            stack: vec![Screen::Home],
        }
    }

    pub fn current(&self) -> &Screen {
        // The stack is never empty: `back` stops at the root.
        &self.stack[self.stack.len() - 1]
    }

    pub fn current_tab(&self) -> Tab {
        self.current().tab()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Pushes `screen`. Switching tab this way resets the stack to that
    /// tab's root first.
    pub fn navigate(&mut self, screen: Screen) {
        let tab = screen.tab();
        if tab != self.current_tab() {
            self.stack = vec![tab.root()];
        }
        if self.current() != &screen {
            self.stack.push(screen);
        }
        debug!("Navigated to {:?} (depth {})", self.current(), self.depth());
    }

    /// Bottom-bar press: the stack becomes the tab's root.
    pub fn select_tab(&mut self, tab: Tab) {
        self.stack = vec![tab.root()];
    }

    /// Pops one screen. Returns `false` at the root.
    pub fn back(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        self.stack.pop();
        true
    }
}
