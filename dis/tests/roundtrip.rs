use arch::Error;
use pgdis::{disassemble, Disassembler};
use pretty_assertions::assert_eq;
use std::fs;

const PROGRAMS: [&str; 4] = [
    "loop: add\n jmp loop\n",
    "
        push 10
        pop cx
top:    push cx
        out
        dec cx
        push cx
        push 0
        ja top
        hlt
    ",
    "
        call main
        hlt
square: dup
        mul
        ret
main:   in
        call square
        out
        push [100]
        push 8[bx]
        push -8[bx]
        pop [bx]
        inc [0x10]
        jmp done
        sqrt
done:
    ",
    "
        push -2147483648
        push 0b101
        push 0o17
        sub
        draw
end:    je end
        jne end
        jae end
        jbe end
        jb end
    ",
];

fn round_trip(src: &str) {
    let bin = pgasm::assemble(src).unwrap_or_else(|e| panic!("{:?}: {}", src, e));
    let text = disassemble(&bin).unwrap();
    let again = pgasm::assemble(&text).unwrap_or_else(|e| panic!("{}\n{}", text, e));
    assert_eq!(bin, again, "{}", text);
}

#[test]
fn reassembles_to_identical_bytes() {
    for src in PROGRAMS {
        round_trip(src);
    }
}

#[test]
fn labels_named_in_address_order() {
    let bin = pgasm::assemble("jmp end\nback: push bx\njne back\nend:\n").unwrap();
    assert_eq!(
        disassemble(&bin).unwrap(),
        "\tjmp\tL1\nL0:\n\tpush\tbx\n\tjne\tL0\nL1:\n"
    );
}

#[test]
fn label_array_is_sorted() {
    for src in PROGRAMS {
        let bin = pgasm::assemble(src).unwrap();
        let dis = Disassembler::new(&bin).unwrap();
        let addrs = dis.labels().as_slice();
        assert!(addrs.windows(2).all(|w| w[0] < w[1]), "{:?}", addrs);
    }
}

#[test]
fn operand_spelling() {
    let operands = ["5", "-3", "bx", "[100]", "[bx]", "8[bx]", "-8[bx]"];
    let src: String = operands.iter().map(|op| format!("push {}\n", op)).collect();
    let expect: String = operands.iter().map(|op| format!("\tpush\t{}\n", op)).collect();
    let bin = pgasm::assemble(&src).unwrap();
    assert_eq!(disassemble(&bin).unwrap(), expect);
}

#[test]
fn decode_errors_surface() {
    let mut bin = pgasm::assemble("push 1\n").unwrap();
    bin.pop();
    assert!(matches!(
        disassemble(&bin),
        Err(Error::TruncatedOperand { .. })
    ));
    let mut bin = pgasm::assemble("hlt\n").unwrap();
    bin[12] = 0x3F;
    assert!(matches!(
        disassemble(&bin),
        Err(Error::UnknownInstruction { byte: 0x3F, .. })
    ));
}

#[test]
fn file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let bin_path = dir.path().join("prog.pegas");
    let asm_path = dir.path().join("prog.asm");
    let bin = pgasm::assemble(PROGRAMS[2]).unwrap();
    fs::write(&bin_path, &bin).unwrap();

    pgdis::disassemble_file(&bin_path, &asm_path).unwrap();
    let text = fs::read_to_string(&asm_path).unwrap();
    assert_eq!(pgasm::assemble(&text).unwrap(), bin);
}

#[test]
fn broken_binary_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let bin_path = dir.path().join("bad.pegas");
    let asm_path = dir.path().join("bad.asm");
    fs::write(&bin_path, b"ITSPEGAS\x02\x00\x00\x00").unwrap();

    let err = pgdis::disassemble_file(&bin_path, &asm_path).unwrap_err();
    assert!(matches!(err, Error::IncompatibleVersion { found: 2, .. }));
    assert!(!asm_path.exists());

    let err = pgdis::disassemble_file(&asm_path, &bin_path).unwrap_err();
    assert!(matches!(err, Error::WrongExtension(..)));
}
