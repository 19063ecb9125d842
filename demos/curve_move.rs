//! Curve-shaped moves on a link that is already running at high speed.

use std::thread;
use std::time::Duration;

use makcu::{Connection, HIGH_SPEED_BAUD_RATE};

fn main() -> makcu::device::Result<()> {
    let port = makcu::find()?;
    let mut conn = Connection::open(&port, HIGH_SPEED_BAUD_RATE)?;
    thread::sleep(Duration::from_secs(1));

    conn.mouse_move_curve(100, 100, &[10, 70, 30])?;
    thread::sleep(Duration::from_millis(100));
    conn.mouse_move_curve(-56, -200, &[10, 89, 54])?;
    thread::sleep(Duration::from_secs(2));
    conn.mouse_move_curve(100, 100, &[3])?;

    conn.close()
}
