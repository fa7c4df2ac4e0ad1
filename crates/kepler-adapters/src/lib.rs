// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! HTTP-backed implementations of the collaborator traits `kepler-core`
//! defines (spec.md §6): a Home-Assistant-flavored `Actuator` and a
//! `ForecastProvider` that reads spot-price and PV-forecast sensors through
//! the same bridge. `kepler-main` wires one of these into the core at
//! startup; tests swap in fakes instead.

pub mod ha;

pub use ha::{HaActuator, HaClient, HaConfig, HaError, HaForecastProvider};
