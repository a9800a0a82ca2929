use bigbutton::*;

fn main() {
    let mut b = bigbutton::standard::board::Board::open(DEFAULT_DEVICE_PATH, BAUD_RATE).unwrap();
    std::thread::sleep(SETTLE_PERIOD);

    let mut on = true;

    loop {
        std::thread::sleep(std::time::Duration::from_millis(200));
        println!("{}", on);
        if on {
            b.led_on().unwrap();
        } else {
            b.led_off().unwrap();
        }
        on = !on;
    }
}
