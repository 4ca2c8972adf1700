// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

pub mod util;
