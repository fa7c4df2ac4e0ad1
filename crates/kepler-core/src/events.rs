// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

use bevy_ecs::prelude::*;
use chrono::{DateTime, Utc};

/// Fired by the Scheduler once a new schedule has been persisted, so the
/// Executor (and any observer, e.g. a dashboard) can react without polling
/// the Store.
#[derive(Event, Debug, Clone)]
pub struct ScheduleUpdated {
    pub planned_at: DateTime<Utc>,
    pub horizon_start: DateTime<Utc>,
    pub horizon_end: DateTime<Utc>,
    pub slot_count: usize,
}
