use prox_core::traits::Validate;
use prox_core::{ProxError, Result};

use super::face::Face;
use super::loops::{check_chain, Loop};
use super::shell::Shell;

impl Validate for Loop {
    fn validate(&self) -> Result<()> {
        check_chain(self.curves())?;
        self.check_polygon()
    }
}

impl Validate for Face {
    fn validate(&self) -> Result<()> {
        self.surface().validate()?;
        for (i, hole) in self.inner().iter().enumerate() {
            let inside = hole
                .polygon()
                .first()
                .is_some_and(|&p| self.outer().winding_number(p) != 0);
            if !inside || hole.crosses(self.outer()) {
                return Err(ProxError::DegenerateGeometry(format!(
                    "hole {i} is not inside the outer loop"
                )));
            }
            if self.inner()[..i].iter().any(|other| other.crosses(hole)) {
                return Err(ProxError::DegenerateGeometry(format!(
                    "hole {i} crosses another hole"
                )));
            }
        }
        Ok(())
    }
}

impl Validate for Shell {
    fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(ProxError::DegenerateGeometry("shell has no faces".into()));
        }
        self.faces().iter().try_for_each(Validate::validate)
    }
}
