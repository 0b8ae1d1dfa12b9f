use std::{thread, time::Duration};

use ratatui::backend::TestBackend;
use rmodbus::server::context::ModbusContext;

use modpoll::{
    core::{
        run_poll_session, ChannelEvents, LifecycleEvent, Outcome, PollContext, PollError,
        PollState, Scheduler, ShutdownCause,
    },
    protocol::{
        simulator::DeviceSimulator, Backend, DataSpace, DeviceTarget, PollConfig, ReadRequest,
        SampleBuffer, Session,
    },
    tui::Dashboard,
};

fn config(port: u16, space: DataSpace, reference: u32, count: u16) -> PollConfig {
    PollConfig {
        target: DeviceTarget {
            backend: Backend::Tcp,
            host: "127.0.0.1".to_string(),
            port,
            unit_id: 1,
        },
        request: ReadRequest {
            space,
            reference,
            count,
        },
        poll_interval: Duration::from_millis(20),
    }
}

fn row_text(dashboard: &Dashboard<TestBackend>, y: u16) -> String {
    let buffer = dashboard.backend().buffer();
    (0..buffer.area().width)
        .map(|x| buffer[(x, y)].symbol())
        .collect()
}

fn sample_row_text(dashboard: &Dashboard<TestBackend>, index: usize) -> String {
    let row = dashboard
        .geometry()
        .sample_row(index)
        .expect("sample row on screen");
    row_text(dashboard, row).chars().skip(2).collect()
}

#[test]
fn test_input_register_default_read() {
    let simulator = DeviceSimulator::bind("127.0.0.1:0", vec![1]).unwrap();
    simulator.storage().lock().set_input(99, 1234).unwrap();
    let (addr, _server) = simulator.spawn().unwrap();

    let mut ctx = PollContext::new(config(addr.port(), DataSpace::InputRegisters, 100, 1));
    ctx.connect().unwrap();
    assert_eq!(ctx.state(), PollState::Connected);
    ctx.start_display(TestBackend::new(80, 20)).unwrap();

    assert_eq!(ctx.poll_once().unwrap(), 1);
    assert_eq!(ctx.buffer().unwrap().value(0), Some(1234));
    let dashboard = ctx.dashboard().unwrap();
    assert!(sample_row_text(dashboard, 0).starts_with("[100]: 1234"));
}

#[test]
fn test_coils_read() {
    let simulator = DeviceSimulator::bind("127.0.0.1:0", vec![1]).unwrap();
    {
        let storage = simulator.storage();
        let mut storage = storage.lock();
        storage.set_coil(0, true).unwrap();
        storage.set_coil(1, false).unwrap();
        storage.set_coil(2, true).unwrap();
    }
    let (addr, _server) = simulator.spawn().unwrap();

    let mut ctx = PollContext::new(config(addr.port(), DataSpace::Coils, 1, 3));
    ctx.connect().unwrap();
    ctx.start_display(TestBackend::new(60, 16)).unwrap();
    assert_eq!(ctx.poll_once().unwrap(), 3);

    let dashboard = ctx.dashboard().unwrap();
    assert_eq!(dashboard.samples(), ["[1]: 1", "[2]: 0", "[3]: 1"]);
    assert!(sample_row_text(dashboard, 1).starts_with("[2]: 0"));
}

#[test]
fn test_holding_registers_follow_device_changes() {
    let simulator = DeviceSimulator::bind("127.0.0.1:0", vec![1]).unwrap();
    let storage = simulator.storage();
    storage.lock().set_holding(9, 1).unwrap();
    let (addr, _server) = simulator.spawn().unwrap();

    let mut ctx = PollContext::new(config(addr.port(), DataSpace::HoldingRegisters, 10, 1));
    ctx.connect().unwrap();
    ctx.start_display(TestBackend::new(60, 16)).unwrap();
    ctx.poll_once().unwrap();
    assert_eq!(ctx.dashboard().unwrap().samples(), ["[10]: 1"]);

    storage.lock().set_holding(9, 65535).unwrap();
    ctx.poll_once().unwrap();
    assert_eq!(ctx.dashboard().unwrap().samples(), ["[10]: 65535"]);
}

#[test]
fn test_connection_refused_before_display() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let (_tx, mut events) = ChannelEvents::new();
    let err = run_poll_session(
        config(port, DataSpace::InputRegisters, 100, 1),
        TestBackend::new(40, 12),
        &mut events,
    )
    .unwrap_err();
    assert!(matches!(err, PollError::ConnectionFailed { .. }));
    assert!(err.is_fatal());
}

#[test]
fn test_unsupported_backend_exits_cleanly() {
    let mut config = config(502, DataSpace::InputRegisters, 100, 1);
    config.target.backend = Backend::Udp;
    let (_tx, mut events) = ChannelEvents::new();
    let err = run_poll_session(config, TestBackend::new(40, 12), &mut events).unwrap_err();
    assert_eq!(err.to_string(), "Modbus UDP/IP mode is not yet supported.");
    assert!(!err.is_fatal());
}

#[test]
fn test_device_disconnect_tears_down() {
    let simulator = DeviceSimulator::bind("127.0.0.1:0", vec![1])
        .unwrap()
        .with_request_limit(2);
    let (addr, _server) = simulator.spawn().unwrap();

    let mut ctx = PollContext::new(config(addr.port(), DataSpace::InputRegisters, 1, 2));
    ctx.connect().unwrap();
    ctx.start_display(TestBackend::new(60, 16)).unwrap();

    let (_tx, mut events) = ChannelEvents::new();
    let mut scheduler = Scheduler::new(Duration::from_millis(10));
    let err = scheduler.run(&mut ctx, &mut events).unwrap_err();

    assert!(matches!(err, PollError::Read { .. }), "{err}");
    assert!(err.is_fatal());
    assert_eq!(scheduler.cycles(), 2);
    assert_eq!(ctx.state(), PollState::Terminated);
    assert!(ctx.session().is_none());
    assert!(ctx.buffer().is_none());
    assert!(ctx.dashboard().is_none());

    // a second teardown after the scheduler's own is harmless
    ctx.teardown();
    assert_eq!(ctx.state(), PollState::Terminated);
}

#[test]
fn test_signal_shutdown_after_resize() {
    let simulator = DeviceSimulator::bind("127.0.0.1:0", vec![1]).unwrap();
    let (addr, _server) = simulator.spawn().unwrap();

    let (tx, mut events) = ChannelEvents::new();
    tx.send(LifecycleEvent::Resize {
        width: 50,
        height: 14,
    })
    .unwrap();
    tx.send(LifecycleEvent::Shutdown(ShutdownCause::Signal(1)))
        .unwrap();

    let outcome = run_poll_session(
        config(addr.port(), DataSpace::InputRegisters, 100, 2),
        TestBackend::new(80, 24),
        &mut events,
    )
    .unwrap();
    assert_eq!(outcome, Outcome::Shutdown(ShutdownCause::Signal(1)));
}

#[test]
fn test_unknown_unit_times_out() {
    let simulator = DeviceSimulator::bind("127.0.0.1:0", vec![2]).unwrap();
    let (addr, _server) = simulator.spawn().unwrap();

    let config = config(addr.port(), DataSpace::InputRegisters, 1, 1);
    let mut session = Session::open(&config.target).unwrap();
    let mut buffer = SampleBuffer::allocate(DataSpace::InputRegisters, 1).unwrap();
    let err =
        modpoll::protocol::read_samples(&mut session, &config.request, &mut buffer).unwrap_err();
    assert_eq!(err.to_string(), "Connection timed out");
}

#[test]
fn test_value_generator_fills_every_table() {
    let simulator = DeviceSimulator::bind("127.0.0.1:0", vec![1]).unwrap();
    let storage = simulator.storage();
    modpoll::protocol::simulator::spawn_value_generator(
        storage.clone(),
        10,
        Duration::from_millis(5),
    )
    .unwrap();
    thread::sleep(Duration::from_millis(30));

    let storage = storage.lock();
    for reg in 0..10 {
        let value = storage.get_input(reg).unwrap();
        assert!(value <= 1000);
        assert_eq!(storage.get_holding(reg).unwrap(), value);
        assert_eq!(storage.get_coil(reg).unwrap(), value != 0);
        assert_eq!(storage.get_discrete(reg).unwrap(), value != 0);
    }
}
