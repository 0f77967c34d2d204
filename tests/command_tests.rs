//! Command engine tests on the example board model

use dtsh::shell::{resolve, DtShell, ShellError};
use dtsh::ui::{StyleSheet, Terminal, Theme};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn example_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("example")
}

fn shell() -> DtShell {
    let dir = example_dir();
    DtShell::open(&dir.join("board.json"), &[dir.join("bindings")]).unwrap()
}

/// Run one command line, returning its result and output.
fn exec(shell: &mut DtShell, line: &str) -> (Result<(), ShellError>, String) {
    let buffer = SharedBuffer::default();
    let styles = StyleSheet::from_theme(Theme::default_theme());
    let mut term = Terminal::new(Box::new(buffer.clone()), styles, false);
    let result = shell.exec_command_string(line, &mut term);
    let out = String::from_utf8_lossy(&buffer.0.borrow()).into_owned();
    (result, out)
}

#[test]
fn test_bindings_are_matched() {
    let shell = shell();
    let uart = shell.path2node("/soc/uart@40002000").unwrap();
    assert_eq!(uart.matching_compat.as_deref(), Some("nordic,nrf-uarte"));
    assert!(uart
        .binding_path
        .as_ref()
        .is_some_and(|p| p.ends_with("serial/nordic,nrf-uarte.yaml")));
    assert_eq!(
        uart.description.as_deref(),
        Some("Nordic nRF family UARTE (UART with EasyDMA)")
    );

    let led = shell.path2node("/leds/led_0").unwrap();
    let gpio = shell.path2node("/soc/gpio@50000000").unwrap();
    assert_eq!(led.depends_on, vec!["/soc/gpio@50000000".to_string()]);
    assert_eq!(gpio.required_by, vec!["/leds/led_0".to_string()]);
}

#[test]
fn test_pwd_and_cd() {
    let mut shell = shell();
    assert_eq!(exec(&mut shell, "pwd"), (Ok(()), "/\n".to_string()));

    assert_eq!(exec(&mut shell, "cd soc/gpio@50000000"), (Ok(()), String::new()));
    assert_eq!(exec(&mut shell, "pwd").1, "/soc/gpio@50000000\n");
    exec(&mut shell, "cd ..").0.unwrap();
    assert_eq!(shell.pwd(), "/soc");
    exec(&mut shell, "cd").0.unwrap();
    assert_eq!(shell.pwd(), "/");
}

#[test]
fn test_ls() {
    let mut shell = shell();
    let (result, out) = exec(&mut shell, "ls /soc");
    result.unwrap();
    assert_eq!(
        out,
        "/soc/uart@40002000\n/soc/i2c@40003000\n/soc/gpio@50000000\n"
    );

    let (_, out) = exec(&mut shell, "ls -d /soc /cpus");
    assert_eq!(out, "/soc\n/cpus\n");

    let (_, out) = exec(&mut shell, "ls /cpus /leds");
    assert_eq!(out, "/cpus:\n/cpus/cpu@0\n\n/leds:\n/leds/led_0\n");
}

#[test]
fn test_ls_rich() {
    let mut shell = shell();
    let (result, out) = exec(&mut shell, "ls -l /soc");
    result.unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "/soc:");
    assert!(lines[1].starts_with("Name"));
    assert!(lines[3].starts_with("uart "));
    assert!(lines[3].contains("0x40002000"));
    assert!(lines[3].contains("nordic,nrf-uarte"));
    assert!(lines[5].starts_with("gpio "));
}

#[test]
fn test_tree() {
    let mut shell = shell();
    let (result, out) = exec(&mut shell, "tree /soc");
    result.unwrap();
    // i2c@40003000 is disabled: its sensor is not shown.
    assert_eq!(
        out,
        "/soc\n├── uart@40002000\n├── i2c@40003000\n└── gpio@50000000\n"
    );

    let (_, out) = exec(&mut shell, "tree -L 1");
    assert_eq!(
        out,
        "/\n├── chosen\n├── aliases\n├── cpus\n├── leds\n└── soc\n"
    );

    let (_, out) = exec(&mut shell, "tree --depth 2 /leds");
    assert_eq!(out, "/leds\n└── led_0\n");
}

#[test]
fn test_cat_property() {
    let mut shell = shell();
    let (result, out) = exec(&mut shell, "cat /soc/uart@40002000$current-speed");
    result.unwrap();
    assert!(out.starts_with("Property\n"));
    assert!(out.contains("Name:     current-speed"));
    assert!(out.contains("115200"));
    assert!(out.contains("Initial baud rate setting for UART"));

    exec(&mut shell, "cd /soc/gpio@50000000").0.unwrap();
    let (result, out) = exec(&mut shell, "cat $port");
    result.unwrap();
    assert_eq!(out, "Property\n  Name:  port\n  Value: 0\n\n");

    let (result, _) = exec(&mut shell, "cat $nope");
    assert_eq!(
        result,
        Err(ShellError::Failed {
            command: "cat".into(),
            message: "no such property: nope".into()
        })
    );
}

#[test]
fn test_cat_node() {
    let mut shell = shell();
    let (result, out) = exec(&mut shell, "cat /soc/uart@40002000");
    result.unwrap();
    for section in [
        "Node\n",
        "Description\n",
        "Depends-on\n",
        "Required-by\n",
        "Registers\n",
        "Properties\n",
        "Binding\n",
    ] {
        assert!(out.contains(section), "missing section {:?}", section);
    }
    assert!(out.contains("0x40002000"));
    // The binding file content is shown.
    assert!(out.contains("hw-flow-control:"));
}

#[test]
fn test_man() {
    let mut shell = shell();
    let (result, out) = exec(&mut shell, "man --compat nordic,nrf-gpio");
    result.unwrap();
    assert!(out.contains("NRF5 GPIO node."));
    assert!(out.contains("One node per GPIO port."));

    let (result, out) = exec(&mut shell, "man tree");
    result.unwrap();
    assert!(out.starts_with("tree\n"));
    assert!(out.contains("--depth"));

    let (result, _) = exec(&mut shell, "man --compat acme,nothing");
    assert!(matches!(result, Err(ShellError::Failed { .. })));
}

#[test]
fn test_help_and_usage() {
    let mut shell = shell();
    let (result, out) = exec(&mut shell, "tree -h");
    result.unwrap();
    assert!(out.contains("Usage: tree"));

    let (result, _) = exec(&mut shell, "tree -L many");
    assert!(matches!(result, Err(ShellError::Usage { command, .. }) if command == "tree"));

    let (result, out) = exec(&mut shell, "lsblk");
    assert_eq!(result, Err(ShellError::CommandNotFound("lsblk".into())));
    assert!(out.is_empty());
}

#[test]
fn test_completion_on_model() {
    let shell = shell();
    assert_eq!(
        resolve(&shell, "man --compat nordic,nrf-u", "nordic,nrf-u").candidates(),
        vec!["nordic,nrf-uarte"]
    );
    assert_eq!(
        resolve(&shell, "cd /soc/g", "/soc/g").candidates(),
        vec!["/soc/gpio@50000000"]
    );
    assert_eq!(
        resolve(&shell, "tree /l", "/l").candidates(),
        vec!["/leds/"]
    );
}
