//! Back-office engine for a doorstep car-wash subscription service:
//! catalog and customer lookup, the five-step subscription wizard, and
//! the REST surface the operator console talks to.

pub mod backend;
