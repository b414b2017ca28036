//! Arena identities. The IR never stores direct ownership pointers between entities —
//! adjacency is stored by reference ids (arena + indices) instead, so every
//! cross-reference is one of these keys into a [`slotmap::SlotMap`] owned by
//! [`crate::ir::Ir`].

slotmap::new_key_type! {
    pub struct NodeId;
    pub struct PortId;
    pub struct VariableId;
    pub struct ReactionId;
    pub struct StateId;
}
