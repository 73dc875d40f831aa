//! Static per-[`InputData`] flow skeleton shared by every preference-limit solve.
//!
//! Grounded on `examples/original_source/src/MipFlowStaticData.h`/`.cpp`. The source packs node
//! keys into a single `long`; per `SPEC_FULL.md` §12's "typed node/edge ids" note this is expressed
//! instead as small `enum`/struct-of-fields keys, which still sort and hash just as cheaply via
//! `#[derive(PartialOrd, Ord, Hash)]` and read legibly at every call site.

use crate::ids::{ChoiceId, ChooserId, SlotId};
use crate::input_data::InputData;
use crate::mip_flow::MipFlow;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum NodeKey {
    ChooserSlot(ChooserId, SlotId),
    Choice(ChoiceId),
    Slot(SlotId),
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EdgeKey(pub usize, pub usize);

#[must_use]
pub fn node_chooser(p: ChooserId, s: SlotId) -> NodeKey {
    NodeKey::ChooserSlot(p, s)
}

#[must_use]
pub fn node_slot(s: SlotId) -> NodeKey {
    NodeKey::Slot(s)
}

#[must_use]
pub fn node_choice(w: ChoiceId) -> NodeKey {
    NodeKey::Choice(w)
}

#[must_use]
pub fn edge_id(from: usize, to: usize) -> EdgeKey {
    EdgeKey(from, to)
}

/// The part of the flow network that is identical for every preference limit within a single
/// scheduling: all chooser/slot nodes, all choice nodes, and all slot nodes.
pub struct MipFlowStaticData {
    pub base_flow: MipFlow<NodeKey, EdgeKey>,
}

impl MipFlowStaticData {
    #[must_use]
    pub fn new(input: &InputData) -> Self {
        let mut base_flow = MipFlow::new();
        for p in input.chooser_ids() {
            for s in input.slot_ids() {
                base_flow.add_node(node_chooser(p, s));
            }
        }
        for w in input.choice_ids() {
            base_flow.add_node(node_choice(w));
        }
        for s in input.slot_ids() {
            base_flow.add_node(node_slot(s));
        }
        Self { base_flow }
    }
}
