use rstest::rstest;
use vibewatch_traits::{Display, DisplayFrame};
use vibewatch_ui::{TerminalDisplay, render_lines};

fn frame(choice: usize) -> DisplayFrame {
    DisplayFrame {
        choice,
        vibration_threshold: 1.08,
        temperature_threshold: 30.0,
        min_floor: 0.16,
        total_vibration: 0.5,
        axes: [0.3, -0.4, 0.0],
        temperature: 24.5,
        temperature_input: 0.5,
        vibration_input: 0.5,
    }
}

#[rstest]
#[case(0, &["Vib Threshold: 1.08", "Temp Threshold: 30.00", "Min vib: 0.16"])]
#[case(1, &["Current Vib: 0.50", "Current Temp: 24.50", "Vib(x,y,z): 0.30, -0.40, 0.00"])]
#[case(2, &["Current Pot1 value: 0.50", "Current Pot2 value: 0.50"])]
#[case(3, &["Out of range"])]
#[case(99, &["Out of range"])]
fn panel_text(#[case] choice: usize, #[case] expected: &[&str]) {
    assert_eq!(render_lines(&frame(choice)), expected);
}

#[test]
fn messages_and_panels_are_written_as_blocks() {
    let mut d = TerminalDisplay::new(Vec::new());
    d.show_message("Connect storage");
    d.render(&frame(2));
    let text = String::from_utf8(d.into_inner()).unwrap();
    assert_eq!(
        text,
        "Connect storage\n\nCurrent Pot1 value: 0.50\nCurrent Pot2 value: 0.50\n\n"
    );
}
