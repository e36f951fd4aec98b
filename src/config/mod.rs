pub mod crier_profile;

pub use crier_profile::{CrierProfile, Credentials, IntroMode, ScheduleMode, ShortFeedPolicy};
