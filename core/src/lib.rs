// Kickboard Core Library
// Real-time dashboards: components in the browser, callbacks on the server

pub mod app;
pub mod component;
pub mod dashboard;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod registry;
pub mod scheduler;
pub mod subscription;
pub mod telemetry;
pub mod widgets;

// Export core types
pub use app::App;
pub use component::{Component, ComponentId, Decoder, Getter};
pub use dashboard::{DashboardConfig, DashboardServer, EventBroadcaster};
pub use dispatcher::{DispatchReport, Dispatcher};
pub use error::{KickboardError, Result};
pub use event::{EventKey, EventPayload, ServerMessage};
pub use registry::ComponentRegistry;
pub use scheduler::Scheduler;
pub use subscription::{Callback, Subscription, SubscriptionTable};
