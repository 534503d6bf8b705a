use lazy_static::lazy_static;

use std::sync::Mutex;

const STARTING_PORT: u16 = 20000;
const PORT_STEP: u16 = 10;

pub struct PseudoRandomMemtextdPort {
    port: u16,
}

impl PseudoRandomMemtextdPort {
    pub fn new() -> PseudoRandomMemtextdPort {
        // test binaries start from different offsets
        let offset = (std::process::id() % 1000) as u16 * PORT_STEP;
        PseudoRandomMemtextdPort {
            port: STARTING_PORT + offset,
        }
    }

    pub fn get_next_port(&mut self) -> u16 {
        self.port += PORT_STEP;
        self.port
    }
}

lazy_static! {
    pub static ref PSEUDO_RANDOM_PORT: Mutex<PseudoRandomMemtextdPort> =
        Mutex::new(PseudoRandomMemtextdPort::new());
}
