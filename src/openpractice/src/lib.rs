#[macro_use]
extern crate log;

mod openpractice;
pub use openpractice::OpenPractice;

mod store;
pub use store::ReadinessStore;

mod readiness;
pub use readiness::{ReadinessManager, ReadinessState};

pub mod scheduler;

mod bridge;
pub use bridge::{ConnectivityBridge, DeviceChannel, HttpChannel, NullChannel};

mod widget;
pub use widget::{STALE_AFTER, WidgetSnapshot};

mod session;
pub use session::{
    COUNTDOWN_TICKS, FinishedPractice, PracticeSession, SensorOutcome, SensorSession, SessionPhase,
};

mod sensor;
pub use sensor::SimulatedSensor;

mod dashboard;
pub use dashboard::DashboardReport;
