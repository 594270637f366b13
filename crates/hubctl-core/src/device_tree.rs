// ── Device Tree Builder ──
//
// Partitions the flat device list by physical port and nests devices by
// bus-id ancestry (`3-1.3.2` sits under `3-1.3`). Ports with power off
// show nothing, whatever the agent still reports on them.

use serde::Serialize;

use crate::model::{AttachedDevice, Port};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Hub,
    Device,
}

/// One node of a port's device tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceNode {
    /// Bus id.
    pub id: String,
    /// Product name, or the bus id when the agent has none.
    pub name: String,
    pub kind: NodeKind,
    pub vendor_id: String,
    pub product_id: String,
    pub busy: bool,
    pub children: Vec<DeviceNode>,
}

impl DeviceNode {
    /// This node plus all descendants.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(DeviceNode::count).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "devices", rename_all = "snake_case")]
pub enum PortState {
    PowerDisabled,
    Empty,
    Populated(Vec<DeviceNode>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortView {
    pub id: u8,
    pub power: bool,
    #[serde(flatten)]
    pub state: PortState,
}

impl PortView {
    /// Root nodes on this port; empty unless populated.
    pub fn devices(&self) -> &[DeviceNode] {
        match &self.state {
            PortState::Populated(nodes) => nodes,
            PortState::PowerDisabled | PortState::Empty => &[],
        }
    }
}

/// Build one view per port, in port order.
pub fn build(ports: &[Port], devices: &[AttachedDevice]) -> Vec<PortView> {
    ports
        .iter()
        .map(|port| {
            let state = if port.power {
                let on_port: Vec<&AttachedDevice> =
                    devices.iter().filter(|d| d.port == port.id).collect();
                let roots = nest(&on_port);
                if roots.is_empty() {
                    PortState::Empty
                } else {
                    PortState::Populated(roots)
                }
            } else {
                PortState::PowerDisabled
            };
            PortView {
                id: port.id,
                power: port.power,
                state,
            }
        })
        .collect()
}

/// `true` if `child` is strictly below `ancestor` in the USB topology.
fn is_descendant(child: &str, ancestor: &str) -> bool {
    child
        .strip_prefix(ancestor)
        .is_some_and(|rest| rest.starts_with('.'))
}

/// Index of the closest ancestor of `devices[idx]` among `devices`.
fn parent_of(devices: &[&AttachedDevice], idx: usize) -> Option<usize> {
    let bus_id = &devices[idx].bus_id;
    devices
        .iter()
        .enumerate()
        .filter(|(i, d)| *i != idx && is_descendant(bus_id, &d.bus_id))
        .max_by_key(|(_, d)| d.bus_id.len())
        .map(|(i, _)| i)
}

fn nest(devices: &[&AttachedDevice]) -> Vec<DeviceNode> {
    let parents: Vec<Option<usize>> = (0..devices.len()).map(|i| parent_of(devices, i)).collect();
    (0..devices.len())
        .filter(|i| parents[*i].is_none())
        .map(|i| node(devices, &parents, i))
        .collect()
}

fn node(devices: &[&AttachedDevice], parents: &[Option<usize>], idx: usize) -> DeviceNode {
    let children: Vec<DeviceNode> = (0..devices.len())
        .filter(|i| parents[*i] == Some(idx))
        .map(|i| node(devices, parents, i))
        .collect();
    let dev = devices[idx];
    DeviceNode {
        id: dev.bus_id.clone(),
        name: if dev.name.is_empty() {
            dev.bus_id.clone()
        } else {
            dev.name.clone()
        },
        kind: if children.is_empty() {
            NodeKind::Device
        } else {
            NodeKind::Hub
        },
        vendor_id: dev.vendor_id.clone(),
        product_id: dev.product_id.clone(),
        busy: dev.occupied,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dev(bus_id: &str, name: &str, port: u8) -> AttachedDevice {
        AttachedDevice {
            bus_id: bus_id.into(),
            vendor_id: "1234".into(),
            product_id: "abcd".into(),
            name: name.into(),
            port,
            occupied: false,
        }
    }

    #[test]
    fn unpowered_port_hides_its_devices() {
        let devices = vec![dev("3-1", "a", 3), dev("3-2", "b", 3), dev("3-3", "c", 3)];
        let tree = build(&Port::defaults(), &devices);
        let port3 = &tree[2];
        assert_eq!(port3.state, PortState::PowerDisabled);
        assert!(port3.devices().is_empty());
    }

    #[test]
    fn groups_by_port() {
        let devices = vec![dev("1-1", "Disk", 1), dev("4-1", "Key", 4), dev("1-2", "Cam", 1)];
        let tree = build(&Port::defaults(), &devices);
        let names: Vec<&str> = tree[0].devices().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Disk", "Cam"]);
        assert_eq!(tree[1].state, PortState::Empty);
        assert_eq!(tree[3].devices().len(), 1);
    }

    #[test]
    fn nests_by_bus_id_ancestry() {
        let devices = vec![
            dev("1-1.3.2", "Mouse", 1),
            dev("1-1", "Hub", 1),
            dev("1-1.3", "Inner hub", 1),
            dev("1-10", "Sibling", 1),
        ];
        let tree = build(&Port::defaults(), &devices);
        let roots = tree[0].devices();
        assert_eq!(roots.len(), 2);

        let hub = &roots[0];
        assert_eq!(hub.id, "1-1");
        assert_eq!(hub.kind, NodeKind::Hub);
        assert_eq!(hub.count(), 3);
        assert_eq!(hub.children[0].id, "1-1.3");
        assert_eq!(hub.children[0].children[0].kind, NodeKind::Device);

        // "1-10" shares a prefix with "1-1" but is not below it.
        assert_eq!(roots[1].id, "1-10");
        assert_eq!(roots[1].kind, NodeKind::Device);
    }

    #[test]
    fn empty_name_falls_back_to_bus_id() {
        let tree = build(&Port::defaults(), &[dev("2-1", "", 2)]);
        assert_eq!(tree[1].devices()[0].name, "2-1");
    }
}
