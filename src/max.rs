//! Finds the passengers with the most flights.

use std::fmt;

use crate::error::{Error, Result};
use crate::record_types::{FlightCount, PassengerCounts, PassengerId};

/// All passengers sharing the highest flight count, in ascending id order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopPassengers {
    pub passengers: Vec<PassengerId>,
    pub max_flights: FlightCount,
}

impl fmt::Display for TopPassengers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let quoted: Vec<String> = self.passengers.iter().map(|p| format!("'{}'", p)).collect();
        writeln!(f, "Top passenger(s): [{}]", quoted.join(", "))?;
        write!(f, "Maximum number of flights: {}", self.max_flights)
    }
}

/// Scans `counts` once. Fails with EmptyDataset if there is nothing to rank.
pub fn find_max(counts: &PassengerCounts) -> Result<TopPassengers> {
    let mut top = TopPassengers {
        passengers: Vec::new(),
        max_flights: 0,
    };

    for (passenger, &n) in counts {
        if n > top.max_flights || top.passengers.is_empty() {
            top.max_flights = n;
            top.passengers.clear();
            top.passengers.push(passenger.clone());
        } else if n == top.max_flights {
            top.passengers.push(passenger.clone());
        }
    }

    if top.passengers.is_empty() {
        return Err(Error::EmptyDataset);
    }
    Ok(top)
}
