use super::{Body, Locomotion};
use crate::error::SceneError;
use crate::math::Vec3;
use std::collections::VecDeque;

/// FIFO of waypoints handed to a `Locomotion` one at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    waypoints: VecDeque<Vec3>,
}

impl Route {
    pub fn new<I: IntoIterator<Item = Vec3>>(waypoints: I) -> Self {
        Route {
            waypoints: waypoints.into_iter().collect(),
        }
    }

    pub fn push(&mut self, waypoint: Vec3) {
        self.waypoints.push_back(waypoint);
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn peek(&self) -> Option<&Vec3> {
        self.waypoints.front()
    }

    /// Sends the controller to the next waypoint. Returns the waypoint, or
    /// `None` once the route is exhausted.
    pub fn next_location(
        &mut self,
        loco: &mut Locomotion,
        body: &mut dyn Body,
    ) -> Result<Option<Vec3>, SceneError> {
        match self.waypoints.pop_front() {
            Some(waypoint) => {
                loco.move_to_point(body, waypoint)?;
                log::debug!("heading for {:?}, {} left", waypoint, self.waypoints.len());
                Ok(Some(waypoint))
            }
            None => Ok(None),
        }
    }
}
