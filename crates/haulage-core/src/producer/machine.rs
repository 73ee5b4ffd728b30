//! Generic data-driven machines.

use super::ProducerState;
use crate::id::MachineTypeId;
use crate::item::{ItemStack, ReservedItems, aggregate, take_shopping_list_where};
use crate::registry::{InputRequirement, MachineDef, OutputRule, Registry};
use serde::{Deserialize, Serialize};

/// Per-entity state of a machine placed in the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineInstance {
    pub machine: MachineTypeId,
    /// Finished product waiting for pickup.
    pub held: Option<ItemStack>,
    /// Product being made; becomes `held` when the timer runs out.
    pub pending: Option<ItemStack>,
    pub minutes_until_ready: u32,
    /// The trigger input of the last load, kept for recalculate-on-collect.
    pub last_input: Option<ItemStack>,
}

impl MachineInstance {
    pub fn new(machine: MachineTypeId) -> Self {
        Self {
            machine,
            held: None,
            pending: None,
            minutes_until_ready: 0,
            last_input: None,
        }
    }

    /// Start a machine already holding a finished product.
    pub fn holding(machine: MachineTypeId, product: ItemStack) -> Self {
        Self {
            held: Some(product),
            ..Self::new(machine)
        }
    }

    pub fn state(&self) -> ProducerState {
        if self.held.is_some() {
            ProducerState::AwaitingPickup
        } else if self.pending.is_none() && self.minutes_until_ready == 0 {
            ProducerState::Idle
        } else {
            ProducerState::Working
        }
    }

    /// Run the processing timer forward.
    pub fn advance(&mut self, minutes: u32) {
        if self.pending.is_none() {
            return;
        }
        self.minutes_until_ready = self.minutes_until_ready.saturating_sub(minutes);
        if self.minutes_until_ready == 0 {
            self.held = self.pending.take();
        }
    }

    fn start(&mut self, rule: &OutputRule, input: ItemStack) {
        self.pending = Some(rule.output.produce(&input));
        self.minutes_until_ready = rule.minutes;
        self.last_input = Some(input);
        if rule.minutes == 0 {
            self.held = self.pending.take();
        }
    }

    /// Take the held product and reset the timer. Continuous machines
    /// immediately start their next output from the last input.
    pub(crate) fn collect(&mut self, registry: &Registry, def: Option<&MachineDef>) -> Option<ItemStack> {
        let product = self.held.take();
        self.pending = None;
        self.minutes_until_ready = 0;
        if let Some(def) = def
            && def.recalculate_on_collect
            && let Some(input) = self.last_input
            && let Some(rule) = rule_for(registry, def, &input)
        {
            self.start(rule, input);
        }
        product
    }
}

/// First rule triggered by `input` with enough quantity on hand.
fn rule_for<'d>(registry: &Registry, def: &'d MachineDef, input: &ItemStack) -> Option<&'d OutputRule> {
    def.rules.iter().find(|rule| {
        rule.trigger.input.matches(registry, input.item) && input.quantity >= rule.trigger.quantity
    })
}

/// Take one auxiliary requirement out of `budget`: the first stack that
/// matches and covers the full quantity.
fn take_requirement(
    registry: &Registry,
    budget: &mut [ItemStack],
    req: &InputRequirement,
) -> Option<ItemStack> {
    let stack = budget
        .iter_mut()
        .find(|s| req.input.matches(registry, s.item) && s.quantity >= req.quantity)?;
    stack.quantity -= req.quantity;
    Some(stack.with_quantity(req.quantity))
}

/// Items a load would consume from `source`, without touching it.
///
/// Auxiliary inputs are settled first; if any is missing there is no
/// recipe. The first unreserved stack, in source order, that triggers a rule
/// wins. The result lists the trigger first, then the auxiliary inputs.
pub fn resolve(
    registry: &Registry,
    def: &MachineDef,
    source: &[ItemStack],
    reserved: ReservedItems<'_>,
) -> Option<Vec<ItemStack>> {
    let mut budget = aggregate(&reserved.filter(source));

    let mut auxiliary = Vec::with_capacity(def.additional_inputs.len());
    for req in &def.additional_inputs {
        auxiliary.push(take_requirement(registry, &mut budget, req)?);
    }

    let (candidate, rule) = budget
        .iter()
        .filter(|s| s.quantity > 0)
        .find_map(|s| rule_for(registry, def, s).map(|rule| (s, rule)))?;

    let mut list = Vec::with_capacity(1 + auxiliary.len());
    list.push(candidate.with_quantity(rule.trigger.quantity));
    list.extend(auxiliary);
    Some(list)
}

/// Resolve against `source`, move the items out of it and start processing.
pub(crate) fn fill(
    instance: &mut MachineInstance,
    registry: &Registry,
    source: &mut Vec<ItemStack>,
    reserved: ReservedItems<'_>,
) -> bool {
    if instance.state() != ProducerState::Idle {
        return false;
    }
    let Some(def) = registry.get_machine(instance.machine) else {
        return false;
    };
    let Some(list) = resolve(registry, def, source, reserved) else {
        return false;
    };
    let Some(trigger) = list.first().copied() else {
        return false;
    };
    let Some(rule) = rule_for(registry, def, &trigger) else {
        return false;
    };
    if take_shopping_list_where(source, &list, |s| !reserved.contains(s)).is_none() {
        return false;
    }
    instance.start(rule, trigger);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Quality;
    use crate::test_utils::*;

    fn furnace_def(reg: &Registry) -> &MachineDef {
        reg.get_machine(furnace()).unwrap()
    }

    #[test]
    fn state_follows_held_and_timer() {
        let mut m = MachineInstance::new(cheese_press());
        assert_eq!(m.state(), ProducerState::Idle);
        m.pending = Some(ItemStack::new(cheese(), 1));
        m.minutes_until_ready = 10;
        assert_eq!(m.state(), ProducerState::Working);
        m.advance(4);
        assert_eq!(m.state(), ProducerState::Working);
        m.advance(6);
        assert_eq!(m.state(), ProducerState::AwaitingPickup);
        assert_eq!(m.held, Some(ItemStack::new(cheese(), 1)));
    }

    #[test]
    fn auxiliary_input_is_checked_first() {
        let reg = sample_registry();
        let no_coal = [ItemStack::new(copper_ore(), 10)];
        assert_eq!(resolve(&reg, furnace_def(&reg), &no_coal, ReservedItems::none()), None);

        let with_coal = [ItemStack::new(copper_ore(), 10), ItemStack::new(coal(), 2)];
        assert_eq!(
            resolve(&reg, furnace_def(&reg), &with_coal, ReservedItems::none()),
            Some(vec![ItemStack::new(copper_ore(), 5), ItemStack::new(coal(), 1)])
        );
    }

    #[test]
    fn first_triggering_item_in_source_order_wins() {
        let reg = sample_registry();
        let keg = reg.get_machine(keg()).unwrap();
        let source = [
            ItemStack::new(milk(), 4),
            ItemStack::new(wheat(), 1).with_quality(Quality::Silver),
            ItemStack::new(wheat(), 9),
        ];
        assert_eq!(
            resolve(&reg, keg, &source, ReservedItems::none()),
            Some(vec![ItemStack::new(wheat(), 1).with_quality(Quality::Silver)])
        );
    }

    #[test]
    fn short_trigger_stack_is_skipped() {
        let reg = sample_registry();
        let source = [ItemStack::new(copper_ore(), 3), ItemStack::new(coal(), 1)];
        assert_eq!(resolve(&reg, furnace_def(&reg), &source, ReservedItems::none()), None);
    }

    #[test]
    fn split_stacks_are_aggregated() {
        let reg = sample_registry();
        let source = [
            ItemStack::new(copper_ore(), 3),
            ItemStack::new(coal(), 1),
            ItemStack::new(copper_ore(), 2),
        ];
        assert!(resolve(&reg, furnace_def(&reg), &source, ReservedItems::none()).is_some());
    }

    #[test]
    fn reserved_items_are_invisible() {
        let reg = sample_registry();
        let gold = |s: &ItemStack| s.quality == Quality::Gold;
        let reserved = ReservedItems::new(&gold);
        let press = reg.get_machine(cheese_press()).unwrap();
        let source = [ItemStack::new(milk(), 1).with_quality(Quality::Gold)];
        assert_eq!(resolve(&reg, press, &source, reserved), None);
    }

    #[test]
    fn fill_consumes_and_starts() {
        let reg = sample_registry();
        let mut m = MachineInstance::new(furnace());
        let mut source = vec![ItemStack::new(copper_ore(), 7), ItemStack::new(coal(), 1)];
        assert!(fill(&mut m, &reg, &mut source, ReservedItems::none()));
        assert_eq!(source, vec![ItemStack::new(copper_ore(), 2)]);
        assert_eq!(m.state(), ProducerState::Working);
        assert_eq!(m.pending, Some(ItemStack::new(copper_bar(), 1)));
        assert_eq!(m.minutes_until_ready, 30);
    }

    #[test]
    fn fill_refuses_when_not_idle() {
        let reg = sample_registry();
        let mut m = MachineInstance::holding(cheese_press(), ItemStack::new(cheese(), 1));
        let mut source = vec![ItemStack::new(milk(), 3)];
        assert!(!fill(&mut m, &reg, &mut source, ReservedItems::none()));
        assert_eq!(source, vec![ItemStack::new(milk(), 3)]);
    }

    #[test]
    fn collect_resets_timer() {
        let reg = sample_registry();
        let mut m = MachineInstance::holding(cheese_press(), ItemStack::new(cheese(), 1));
        let product = m.collect(&reg, reg.get_machine(cheese_press()));
        assert_eq!(product, Some(ItemStack::new(cheese(), 1)));
        assert_eq!(m.state(), ProducerState::Idle);
    }

    #[test]
    fn continuous_machine_restarts_on_collect() {
        let reg = sample_registry();
        let mut m = MachineInstance::new(worm_bin());
        let mut source = vec![ItemStack::new(wheat(), 1)];
        assert!(fill(&mut m, &reg, &mut source, ReservedItems::none()));
        m.advance(u32::MAX);
        assert_eq!(m.state(), ProducerState::AwaitingPickup);

        let product = m.collect(&reg, reg.get_machine(worm_bin()));
        assert_eq!(product, Some(ItemStack::new(bait(), 1)));
        assert_eq!(m.state(), ProducerState::Working);
        assert_eq!(m.pending, Some(ItemStack::new(bait(), 1)));
    }
}
