use arch::{
    codec::{Header, SIGNATURE},
    inst::Inst,
    reg::Reg,
    Addr, Error, Loc, Word,
};
use pgemu::{Exit, Hook, Processor, Scripted};
use pretty_assertions::assert_eq;

fn machine(src: &str) -> Processor {
    let bin = pgasm::assemble(src).unwrap_or_else(|e| panic!("{:?}: {}", src, e));
    Processor::load(bin).unwrap()
}

fn run(src: &str, input: &[Word]) -> (Processor, Scripted) {
    let mut cpu = machine(src);
    let mut dev = Scripted::new(input.iter().copied());
    let exit = cpu.run(&mut dev, &mut [], None).unwrap();
    assert_eq!(exit, Exit::Halted);
    assert!(cpu.is_halted());
    (cpu, dev)
}

fn fault(src: &str, input: &[Word]) -> Error {
    let mut cpu = machine(src);
    let mut dev = Scripted::new(input.iter().copied());
    match cpu.run(&mut dev, &mut [], None) {
        Ok(exit) => panic!("{:?} finished with {:?}", src, exit),
        Err(err) => err,
    }
}

fn raw(body: &[u8]) -> Vec<u8> {
    let mut bin = Header::current().to_bytes().to_vec();
    bin.extend_from_slice(body);
    bin
}

#[test]
fn push_immediate_then_memory_then_add() {
    let mut cpu = machine("push 5\npush [0]\nadd\n");
    cpu.set_mem(0, 7).unwrap();
    let exit = cpu.run(&mut Scripted::default(), &mut [], None).unwrap();
    assert_eq!(exit, Exit::Halted);
    assert_eq!(cpu.stack(), &[12]);
}

#[test]
fn arithmetic() {
    let cases: [(&str, Word); 8] = [
        ("push 7\npush 3\nsub", 4),
        ("push 3\npush 7\nsub", -4),
        ("push 6\npush -7\nmul", -42),
        ("push 7\npush 2\ndiv", 3),
        ("push -7\npush 2\ndiv", -3),
        ("push 17\nsqrt", 4),
        ("push 0x7FFFFFFF\npush 1\nadd", Word::MIN),
        ("push 9\ndup\nmul", 81),
    ];
    for (src, expect) in cases {
        let (cpu, _) = run(src, &[]);
        assert_eq!(cpu.stack(), &[expect], "{:?}", src);
    }
}

#[test]
fn addressing_modes() {
    let (cpu, _) = run(
        "
        push 42
        pop bx        ; register
        push bx
        pop [100]     ; direct
        push 100
        pop cx
        push [cx]     ; register + 0
        push 8[cx]
        push 7
        pop 8[cx]     ; register + offset
        push -1[cx]
        inc [100]
        dec bx
        inc 8[cx]
        hlt
        ",
        &[],
    );
    assert_eq!(cpu.stack(), &[42, 0, 0]);
    assert_eq!(cpu.reg(Reg::BX), 41);
    assert_eq!(cpu.reg(Reg::CX), 100);
    assert_eq!(cpu.reg(Reg::AX), 0);
    assert_eq!(cpu.mem(100), Some(43));
    assert_eq!(cpu.mem(108), Some(8));
}

#[test]
fn address_out_of_range() {
    assert!(matches!(
        fault("push [131072]", &[]),
        Error::AddressOutOfRange { addr: 131072, .. }
    ));
    assert!(matches!(
        fault("push -1[ax]", &[]),
        Error::AddressOutOfRange { addr: -1, .. }
    ));
    assert!(matches!(
        fault("push -5\npop [-5]", &[]),
        Error::AddressOutOfRange { .. }
    ));
}

#[test]
fn header_checked_before_execution() {
    let mut bin = raw(&[0]);
    bin[0] ^= 0xFF;
    assert!(matches!(
        Processor::load(bin),
        Err(Error::WrongSignature { .. })
    ));
    assert!(matches!(
        Processor::load(vec![0x49, 0x54]),
        Err(Error::WrongSignature { found: 0 })
    ));

    let newer = Header {
        signature: SIGNATURE,
        version: 2,
    };
    assert!(matches!(
        Processor::load(newer.to_bytes().to_vec()),
        Err(Error::IncompatibleVersion {
            found: 2,
            supported: 1
        })
    ));

    let mut older = Header {
        signature: SIGNATURE,
        version: 0,
    }
    .to_bytes()
    .to_vec();
    older.push(0);
    let mut cpu = Processor::load(older).unwrap();
    assert_eq!(
        cpu.run(&mut Scripted::default(), &mut [], None).unwrap(),
        Exit::Halted
    );
}

#[test]
fn decode_faults() {
    let mut dev = Scripted::default();
    let mut cpu = Processor::load(raw(&[63])).unwrap();
    assert!(matches!(
        cpu.run(&mut dev, &mut [], None),
        Err(Error::UnknownInstruction { byte: 63, .. })
    ));
    let mut cpu = Processor::load(raw(&[1, 5])).unwrap();
    assert!(matches!(
        cpu.run(&mut dev, &mut [], None),
        Err(Error::TruncatedOperand { .. })
    ));
    let mut cpu = Processor::load(raw(&[0x41, 16])).unwrap();
    assert!(matches!(
        cpu.run(&mut dev, &mut [], None),
        Err(Error::WrongArgument { .. })
    ));
}

#[test]
fn stack_underflow() {
    assert!(matches!(
        fault("push 1\nadd", &[]),
        Error::StackUnderflow { stack: "value", .. }
    ));
    assert!(matches!(
        fault("pop ax", &[]),
        Error::StackUnderflow { stack: "value", .. }
    ));
    assert!(matches!(fault("dup", &[]), Error::StackUnderflow { .. }));
    assert!(matches!(
        fault("ret", &[]),
        Error::StackUnderflow { stack: "address", .. }
    ));
}

#[test]
fn arithmetic_faults() {
    assert!(matches!(
        fault("push 1\npush 0\ndiv", &[]),
        Error::ArithmeticFault { .. }
    ));
    assert!(matches!(
        fault("push -4\nsqrt", &[]),
        Error::ArithmeticFault { .. }
    ));
}

#[test]
fn call_and_return() {
    let (cpu, dev) = run(
        "
        push 3
        call square
        out
        hlt
square: dup
        mul
        ret
        ",
        &[],
    );
    assert_eq!(dev.output, vec![9]);
    assert!(cpu.calls().is_empty());
    assert!(cpu.stack().is_empty());
}

#[test]
fn conditional_jumps() {
    let cases = [
        ("ja", 2, 1, 1),
        ("ja", 1, 1, 0),
        ("jae", 1, 1, 1),
        ("jae", 0, 1, 0),
        ("jb", -1, 0, 1),
        ("jb", 1, 0, 0),
        ("jbe", 1, 1, 1),
        ("jbe", 2, 1, 0),
        ("je", 3, 3, 1),
        ("je", 3, 4, 0),
        ("jne", 3, 4, 1),
        ("jne", 3, 3, 0),
    ];
    for (cmd, a, b, taken) in cases {
        let src = format!(
            "push {}\npush {}\n{} yes\npush 0\nout\nhlt\nyes: push 1\nout\n",
            a, b, cmd
        );
        let (cpu, dev) = run(&src, &[]);
        assert_eq!(dev.output, vec![taken], "{} {} {}", cmd, a, b);
        assert!(cpu.stack().is_empty());
    }
}

#[test]
fn counting_loop() {
    let (cpu, dev) = run(
        "
top:    inc ax
        push ax
        push 5
        jb top
        push ax
        out
        ",
        &[],
    );
    assert_eq!(dev.output, vec![5]);
    assert_eq!(cpu.reg(Reg::AX), 5);
}

#[test]
fn step_limit_on_endless_loop() {
    let mut cpu = machine("loop: add\n jmp loop\n");
    for _ in 0..10 {
        cpu.push_value(1).unwrap();
    }
    let exit = cpu.run(&mut Scripted::default(), &mut [], Some(10)).unwrap();
    assert_eq!(exit, Exit::StepLimit);
    assert!(!cpu.is_halted());
    assert_eq!(cpu.stack(), &[1, 1, 1, 1, 6]);
    assert_eq!(cpu.ip(), 12);
}

#[test]
fn jump_to_end_halts() {
    let (cpu, _) = run("jmp end\npush 1\nend:\n", &[]);
    assert!(cpu.stack().is_empty());
    assert_eq!(cpu.ip(), 26);
}

#[test]
fn jump_outside_program() {
    let mut body = vec![13];
    body.extend_from_slice(&5u64.to_le_bytes());
    let mut cpu = Processor::load(raw(&body)).unwrap();
    assert!(matches!(
        cpu.run(&mut Scripted::default(), &mut [], None),
        Err(Error::AddressOutOfRange { addr: 5, .. })
    ));

    let mut body = vec![13];
    body.extend_from_slice(&22u64.to_le_bytes());
    let mut cpu = Processor::load(raw(&body)).unwrap();
    assert!(matches!(
        cpu.run(&mut Scripted::default(), &mut [], None),
        Err(Error::AddressOutOfRange { addr: 22, .. })
    ));
}

#[test]
fn fault_is_terminal() {
    let mut cpu = machine("pop ax\npush 7\nhlt\n");
    let mut dev = Scripted::default();
    assert!(matches!(
        cpu.step(&mut dev),
        Err(Error::StackUnderflow { stack: "value", .. })
    ));
    assert!(cpu.is_faulted());
    assert!(!cpu.is_halted());
    assert_eq!(cpu.fault(), Some(12));
    assert_eq!(cpu.ip(), 12);

    assert!(matches!(
        cpu.step(&mut dev),
        Err(Error::Faulted { .. })
    ));
    assert!(matches!(
        cpu.run(&mut dev, &mut [], None),
        Err(Error::Faulted { .. })
    ));
    assert!(cpu.stack().is_empty());
    assert!(!cpu.is_halted());
}

#[test]
fn decode_fault_is_terminal() {
    let mut cpu = Processor::load(raw(&[8, 63])).unwrap();
    cpu.push_value(1).unwrap();
    let mut dev = Scripted::default();
    assert!(matches!(
        cpu.run(&mut dev, &mut [], None),
        Err(Error::UnknownInstruction { byte: 63, .. })
    ));
    assert_eq!(cpu.fault(), Some(13));
    assert_eq!(cpu.stack(), &[1, 1]);
    assert!(matches!(
        cpu.step(&mut dev),
        Err(Error::Faulted { at: Loc::Offset(13) })
    ));
}

#[test]
fn console_io() {
    let (_, dev) = run("in\nin\nadd\nout\nin\nout\n", &[30, 12, -1]);
    assert_eq!(dev.output, vec![42, -1]);
    assert!(matches!(
        fault("in\nin\n", &[1]),
        Error::InputFailure { .. }
    ));
}

#[test]
fn draw_hands_over_video() {
    let (cpu, dev) = run("push 1\npop [1]\npush 9\npop [257]\ndraw\n", &[]);
    assert_eq!(dev.frames.len(), 1);
    assert_eq!(dev.frames[0].len(), 256);
    assert_eq!(dev.frames[0][0], " #");
    assert_eq!(dev.frames[0][1], " #");
    assert_eq!(dev.frames[0][2], "");
    assert_eq!(cpu.video()[257], 9);
}

#[derive(Default)]
struct Trace {
    inits: usize,
    steps: Vec<(u64, Addr, String)>,
}

impl Hook for Trace {
    fn init(&mut self, _cpu: &Processor) {
        self.inits += 1;
    }
    fn exec(&mut self, time: u64, addr: Addr, inst: &Inst, _cpu: &Processor) {
        self.steps.push((time, addr, inst.to_string()));
    }
}

#[test]
fn hooks_see_every_step() {
    use std::{cell::RefCell, rc::Rc};

    struct Shared(Rc<RefCell<Trace>>);
    impl Hook for Shared {
        fn init(&mut self, cpu: &Processor) {
            self.0.borrow_mut().init(cpu)
        }
        fn exec(&mut self, time: u64, addr: Addr, inst: &Inst, cpu: &Processor) {
            self.0.borrow_mut().exec(time, addr, inst, cpu)
        }
    }

    let trace = Rc::new(RefCell::new(Trace::default()));
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(Shared(trace.clone()))];
    let mut cpu = machine("push 2\npush 3\nadd\nhlt\npush 9\n");
    let exit = cpu.run(&mut Scripted::default(), &mut hooks, None).unwrap();
    assert_eq!(exit, Exit::Halted);
    assert_eq!(cpu.stack(), &[5]);

    let trace = trace.borrow();
    assert_eq!(trace.inits, 1);
    assert_eq!(
        trace.steps,
        vec![
            (0, 12, "push 2".to_string()),
            (1, 17, "push 3".to_string()),
            (2, 22, "add".to_string()),
            (3, 23, "hlt".to_string()),
        ]
    );
}
