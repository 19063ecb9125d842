//! Find the device, bump the link to high speed, then trace circles and
//! run the wheel both ways.

use std::f64::consts::TAU;
use std::thread;
use std::time::Duration;

use makcu::{Connection, DEFAULT_BAUD_RATE};

fn main() -> makcu::device::Result<()> {
    let port = makcu::find()?;
    println!("Found MAKCU on {port}");

    let mut conn = Connection::open(&port, DEFAULT_BAUD_RATE)?;
    thread::sleep(Duration::from_secs(1));
    conn.change_baud_rate()?;

    println!("Moving mouse in a circle...");
    let aspect = 2560.0 / 1440.0;
    for _ in 0..5 {
        for step in 0..50 {
            let t = TAU * step as f64 / 50.0;
            let dx = (25.0 * t.cos()) as i32;
            let dy = (25.0 * aspect * t.sin()) as i32;
            conn.mouse_move(dx, dy)?;
            thread::sleep(Duration::from_millis(10));
        }
    }

    println!("Scrolling mouse...");
    for i in 0..5 {
        conn.scroll(-i)?;
        thread::sleep(Duration::from_millis(50));
    }
    for i in 0..5 {
        conn.scroll(i)?;
        thread::sleep(Duration::from_millis(10));
    }

    println!("Done");
    conn.close()
}
