//! 指令栈的属性测试
//!
//! 使用 proptest 验证 LIFO 与清空语义。

use bytebot_protocol::{Instruction, InstructionKind, InstructionStack};
use proptest::prelude::*;

fn arb_instruction() -> impl Strategy<Value = Instruction> {
    (0u8..6, any::<i32>()).prop_map(|(code, value)| {
        let kind = InstructionKind::from_code(code).unwrap();
        Instruction::from_raw(kind, value)
    })
}

proptest! {
    /// 等量 push/pop 以严格逆序返回，最后一次 pop 为 None
    #[test]
    fn pops_reverse_push_order(insts in prop::collection::vec(arb_instruction(), 0..32)) {
        let mut stack = InstructionStack::new();
        for inst in &insts {
            stack.push(*inst);
        }

        for expected in insts.iter().rev() {
            prop_assert_eq!(stack.pop(), Some(*expected));
        }
        prop_assert_eq!(stack.pop(), None);
    }

    /// N 个元素恰好产生 N 次非空弹出，之后栈为空
    #[test]
    fn drain_yields_exactly_n(insts in prop::collection::vec(arb_instruction(), 0..32)) {
        let mut stack = InstructionStack::new();
        stack.extend(insts.iter().copied());

        let mut count = 0;
        while stack.pop().is_some() {
            count += 1;
        }
        prop_assert_eq!(count, insts.len());
        prop_assert!(stack.is_empty());

        // 再次清空是幂等的
        stack.clear();
        prop_assert!(stack.is_empty());
        prop_assert_eq!(stack.pop(), None);
    }

    /// from_raw 构造的指令总在合法范围内
    #[test]
    fn from_raw_always_in_range(inst in arb_instruction()) {
        prop_assert!(inst.is_in_range());
    }
}
